use std::collections::HashMap;
use std::sync::Mutex;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use tarifa_models::config::TarifaConfig;
use tarifa_models::trigger::{BotReplyDecision, ReplyPool, TriggerSpec};
use tracing::{debug, warn};

/// Decides whether a free-text message gets an automated reply.
///
/// Specs are tried in declaration order. The first one whose words appear as
/// whole words (case-insensitive) decides the outcome alone: a random draw
/// below `verbosity` yields its reply, otherwise the bot stays silent and no
/// later spec is consulted.
///
/// Compiled patterns are memoized per word set, keyed by
/// [`TriggerSpec::canonical_key`].
pub struct TriggerEngine {
    specs: Vec<TriggerSpec>,
    verbosity: f64,
    patterns: Mutex<HashMap<String, Regex>>,
}

impl TriggerEngine {
    /// `verbosity` is clamped to `[0, 1]`.
    pub fn new(specs: Vec<TriggerSpec>, verbosity: f64) -> Self {
        Self {
            specs,
            verbosity: verbosity.clamp(0.0, 1.0),
            patterns: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &TarifaConfig) -> Self {
        Self::new(config.triggers.clone(), config.bot.verbosity)
    }

    pub fn specs(&self) -> &[TriggerSpec] {
        &self.specs
    }

    pub fn verbosity(&self) -> f64 {
        self.verbosity
    }

    /// Number of distinct word sets compiled so far.
    pub fn compiled_patterns(&self) -> usize {
        self.patterns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn match_message(&self, message: &str) -> Option<BotReplyDecision> {
        self.match_with_rng(message, &mut rand::thread_rng())
    }

    pub fn match_with_rng<R: Rng>(&self, message: &str, rng: &mut R) -> Option<BotReplyDecision> {
        for spec in &self.specs {
            let Some(pattern) = self.pattern_for(spec) else {
                continue;
            };
            let Some(found) = pattern.find(message) else {
                continue;
            };

            let draw: f64 = rng.gen();
            if draw >= self.verbosity {
                debug!(trigger = found.as_str(), draw, "Trigger matched, reply suppressed");
                return None;
            }

            let reply = choose_reply(&spec.reply, rng)?;
            debug!(trigger = found.as_str(), reply = %reply, "Trigger matched");
            return Some(BotReplyDecision {
                incoming_message: message.to_string(),
                matched_trigger: found.as_str().to_string(),
                chosen_reply: reply,
            });
        }
        None
    }

    fn pattern_for(&self, spec: &TriggerSpec) -> Option<Regex> {
        let key = spec.canonical_key();
        if key.is_empty() {
            return None;
        }

        let mut patterns = self
            .patterns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(pattern) = patterns.get(&key) {
            return Some(pattern.clone());
        }

        let alternation = spec
            .normalized_words()
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        match Regex::new(&format!(r"(?i)\b(?:{alternation})\b")) {
            Ok(pattern) => {
                patterns.insert(key, pattern.clone());
                Some(pattern)
            }
            Err(e) => {
                warn!(words = ?spec.words, error = %e, "Skipping trigger with invalid pattern");
                None
            }
        }
    }
}

fn choose_reply<R: Rng>(pool: &ReplyPool, rng: &mut R) -> Option<String> {
    match pool {
        ReplyPool::One(reply) => Some(reply.clone()),
        ReplyPool::Many(replies) => replies.choose(rng).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn greeting() -> TriggerSpec {
        TriggerSpec::new(["hola", "hey"], "¡Hola!".into())
    }

    /// Draws 0.0 on every call.
    fn low_draw() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Draws just under 1.0 on every call.
    fn high_draw() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn always_replies_at_full_verbosity() {
        let engine = TriggerEngine::new(vec![greeting()], 1.0);

        let decision = engine.match_message("hey there").unwrap();
        assert_eq!(decision.chosen_reply, "¡Hola!");
        assert_eq!(decision.matched_trigger, "hey");
        assert_eq!(decision.incoming_message, "hey there");
    }

    #[test]
    fn never_replies_at_zero_verbosity() {
        let engine = TriggerEngine::new(vec![greeting()], 0.0);
        assert!(engine.match_message("hey there").is_none());
    }

    #[test]
    fn gate_compares_draw_with_verbosity() {
        let engine = TriggerEngine::new(vec![greeting()], 0.5);
        assert!(engine.match_with_rng("hola", &mut low_draw()).is_some());
        assert!(engine.match_with_rng("hola", &mut high_draw()).is_none());
    }

    #[test]
    fn matches_whole_words_case_insensitively() {
        let engine = TriggerEngine::new(vec![greeting()], 1.0);

        assert_eq!(
            engine.match_message("HOLA a todos").unwrap().matched_trigger,
            "HOLA"
        );
        assert!(engine.match_message("heyday").is_none());
        assert!(engine.match_message("cholas").is_none());
        assert!(engine.match_message("¿hola?").is_some());
    }

    #[test]
    fn first_structural_match_wins() {
        let engine = TriggerEngine::new(
            vec![
                TriggerSpec::new(["luz"], "primero".into()),
                TriggerSpec::new(["precio", "luz"], "segundo".into()),
            ],
            1.0,
        );

        let decision = engine.match_message("el precio de la luz").unwrap();
        assert_eq!(decision.chosen_reply, "primero");
        // The second spec was never compiled, let alone evaluated.
        assert_eq!(engine.compiled_patterns(), 1);
    }

    #[test]
    fn suppressed_match_does_not_fall_through() {
        let engine = TriggerEngine::new(
            vec![
                TriggerSpec::new(["luz"], "primero".into()),
                TriggerSpec::new(["luz"], "segundo".into()),
                TriggerSpec::new(["precio"], "tercero".into()),
            ],
            0.5,
        );

        assert!(engine
            .match_with_rng("el precio de la luz", &mut high_draw())
            .is_none());
        assert_eq!(engine.compiled_patterns(), 1);
    }

    #[test]
    fn later_spec_used_when_earlier_does_not_match() {
        let engine = TriggerEngine::new(
            vec![greeting(), TriggerSpec::new(["luz"], "💡".into())],
            1.0,
        );

        let decision = engine.match_message("se fue la luz").unwrap();
        assert_eq!(decision.chosen_reply, "💡");
        assert_eq!(engine.compiled_patterns(), 2);
    }

    #[test]
    fn patterns_are_memoized_per_word_set() {
        let engine = TriggerEngine::new(
            vec![
                TriggerSpec::new(["hola", "hey"], "a".into()),
                TriggerSpec::new(["Hey", "HOLA"], "b".into()),
            ],
            1.0,
        );

        for _ in 0..3 {
            assert!(engine.match_message("nada que ver").is_none());
        }
        assert_eq!(engine.compiled_patterns(), 1);
    }

    #[test]
    fn reply_pool_picks_one_entry() {
        let pool = vec!["cara".to_string(), "barata".to_string(), "regular".to_string()];
        let engine = TriggerEngine::new(
            vec![TriggerSpec::new(["luz"], ReplyPool::Many(pool.clone()))],
            1.0,
        );

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let decision = engine.match_with_rng("la luz", &mut rng).unwrap();
            assert!(pool.contains(&decision.chosen_reply));
        }
    }

    #[test]
    fn empty_reply_pool_is_silent() {
        let engine = TriggerEngine::new(
            vec![TriggerSpec::new(["luz"], ReplyPool::Many(Vec::new()))],
            1.0,
        );
        assert!(engine.match_message("la luz").is_none());
    }

    #[test]
    fn words_are_matched_literally() {
        let engine = TriggerEngine::new(vec![TriggerSpec::new(["a.b"], "ok".into())], 1.0);

        assert!(engine.match_message("axb").is_none());
        assert!(engine.match_message("mira a.b ahora").is_some());
    }

    #[test]
    fn blank_word_set_never_matches() {
        let engine = TriggerEngine::new(vec![TriggerSpec::new(["", " "], "nunca".into())], 1.0);

        assert!(engine.match_message("cualquier cosa").is_none());
        assert_eq!(engine.compiled_patterns(), 0);
    }

    #[test]
    fn verbosity_is_clamped() {
        assert_eq!(TriggerEngine::new(Vec::new(), 3.0).verbosity(), 1.0);
        assert_eq!(TriggerEngine::new(Vec::new(), -1.0).verbosity(), 0.0);
    }

    #[test]
    fn built_from_config() {
        let mut config = TarifaConfig::default();
        config.bot.verbosity = 1.0;
        config.triggers.push(greeting());

        let engine = TriggerEngine::from_config(&config);
        assert_eq!(engine.specs().len(), 1);
        assert_eq!(engine.match_message("hey").unwrap().chosen_reply, "¡Hola!");
    }
}
