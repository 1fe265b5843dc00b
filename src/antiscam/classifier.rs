use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::lexicon::Lexicon;
use crate::error::{GuardError, GuardResult};

/// Teksty krótsze niż tyle znaków nigdy nie są podejrzane.
pub const MIN_CHARS: usize = 3;

static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("word regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub suspicious: bool,
}

/// Pełny raport dla `/scam-test` – bez przerywania na pierwszym trafieniu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inspection {
    pub suspicious: bool,
    pub glyphs: Vec<String>,
    pub exact_words: Vec<String>,
    pub high_risk: Vec<String>,
    pub keywords: Vec<String>,
    pub patterns: Vec<String>,
    pub keyword_threshold: usize,
}

#[derive(Debug)]
pub struct Classifier {
    lexicon: Lexicon,
    // lowercase raz, przy konstrukcji
    glyphs: Vec<String>,
    exact_words: Vec<String>,
    high_risk: Vec<String>,
    suspicious: Vec<String>,
    patterns: Vec<(String, Regex)>,
}

impl Classifier {
    pub fn new(lexicon: Lexicon) -> GuardResult<Self> {
        let lower = |v: &[String]| v.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>();

        let mut patterns = Vec::with_capacity(lexicon.patterns.len());
        for p in &lexicon.patterns {
            let re = Regex::new(p).map_err(|source| GuardError::Pattern {
                pattern: p.clone(),
                source,
            })?;
            patterns.push((p.clone(), re));
        }

        Ok(Self {
            glyphs: lower(&lexicon.currency_glyphs),
            exact_words: lower(&lexicon.exact_words),
            high_risk: lower(&lexicon.high_risk),
            suspicious: lower(&lexicon.suspicious),
            patterns,
            lexicon,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn classify(&self, text: &str) -> bool {
        self.evaluate(text).suspicious
    }

    pub fn evaluate(&self, text: &str) -> ClassificationResult {
        if text.chars().count() < MIN_CHARS {
            return ClassificationResult { suspicious: false };
        }
        let lower = text.to_lowercase();

        // Tier 1 – jedno trafienie kończy ocenę
        if let Some(g) = self.glyphs.iter().find(|g| lower.contains(g.as_str())) {
            debug!(glyph = %g, "currency glyph hit");
            return ClassificationResult { suspicious: true };
        }
        if let Some(w) = RE_WORD
            .find_iter(&lower)
            .map(|m| m.as_str())
            .find(|w| self.exact_words.iter().any(|e| e == w))
        {
            debug!(word = %w, "exact financial word hit");
            return ClassificationResult { suspicious: true };
        }
        if let Some(k) = self.high_risk.iter().find(|k| lower.contains(k.as_str())) {
            debug!(keyword = %k, "high-risk keyword hit");
            return ClassificationResult { suspicious: true };
        }

        // Tier 2 – akumulacja
        let keyword_hits = self
            .suspicious
            .iter()
            .filter(|k| lower.contains(k.as_str()))
            .count();
        let pattern_hits = self
            .patterns
            .iter()
            .filter(|(_, re)| re.is_match(&lower))
            .count();

        if keyword_hits > 0 || pattern_hits > 0 {
            debug!(keyword_hits, pattern_hits, "tier-2 hits");
        }

        ClassificationResult {
            suspicious: keyword_hits >= self.lexicon.keyword_threshold || pattern_hits > 0,
        }
    }

    pub fn inspect(&self, text: &str) -> Inspection {
        let suspicious = self.classify(text);
        let lower = text.to_lowercase();

        let hits = |list: &[String]| {
            list.iter()
                .filter(|k| lower.contains(k.as_str()))
                .cloned()
                .collect::<Vec<_>>()
        };

        let mut exact_words: Vec<String> = RE_WORD
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .filter(|w| self.exact_words.contains(w))
            .collect();
        exact_words.dedup();

        Inspection {
            suspicious,
            glyphs: hits(&self.glyphs),
            exact_words,
            high_risk: hits(&self.high_risk),
            keywords: hits(&self.suspicious),
            patterns: self
                .patterns
                .iter()
                .filter(|(_, re)| re.is_match(&lower))
                .map(|(p, _)| p.clone())
                .collect(),
            keyword_threshold: self.lexicon.keyword_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_classifier() -> Classifier {
        Classifier::new(Lexicon::default()).unwrap()
    }

    fn fixture() -> Classifier {
        Classifier::new(Lexicon {
            currency_glyphs: vec!["€".into(), "$".into()],
            exact_words: vec!["fric".into()],
            high_risk: vec!["western union".into()],
            suspicious: vec!["crypto".into(), "wallet".into(), "secret".into()],
            patterns: vec![r"link\s+in\s+bio".into()],
            keyword_threshold: 2,
        })
        .unwrap()
    }

    #[test]
    fn short_texts_never_match() {
        let c = default_classifier();
        assert!(!c.classify(""));
        assert!(!c.classify("$"));
        assert!(!c.classify("€€"));
        assert!(c.classify("€€€"));
    }

    #[test]
    fn currency_glyph_is_enough() {
        let c = fixture();
        assert!(c.classify("only 5$ today"));
        assert!(c.classify("ça coûte 10€"));
    }

    #[test]
    fn exact_words_need_word_boundary() {
        let c = fixture();
        assert!(c.classify("envoie le FRIC"));
        // "africain" zawiera "fric" tylko jako podciąg
        assert!(!c.classify("un restaurant africain"));
    }

    #[test]
    fn high_risk_phrase_is_case_insensitive() {
        let c = fixture();
        assert!(c.classify("Paie par Western Union stp"));
    }

    #[test]
    fn one_keyword_is_not_enough_two_are() {
        let c = fixture();
        assert!(!c.classify("parlons de crypto"));
        assert!(c.classify("parlons de crypto et de wallet"));
    }

    #[test]
    fn a_single_pattern_is_enough() {
        let c = fixture();
        assert!(c.classify("more info, link in bio"));
    }

    #[test]
    fn default_lexicon_scenario_message() {
        let c = default_classifier();
        assert!(c.classify("Gagnez 500€ par jour, contactez moi en DM"));
        assert!(!c.classify("salut tout le monde, bonne journée"));
    }

    #[test]
    fn default_patterns_match_without_glyph() {
        let c = default_classifier();
        // "contact moi" + "lien en bio" bez żadnego słowa z tier 1
        let i = c.inspect("contact moi, lien en bio");
        assert!(i.suspicious);
        assert_eq!(i.patterns.len(), 2);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let lex = Lexicon {
            patterns: vec!["(unclosed".into()],
            ..Lexicon::default()
        };
        let err = Classifier::new(lex).unwrap_err();
        assert!(matches!(err, GuardError::Pattern { .. }));
    }

    #[test]
    fn inspect_reports_every_hit() {
        let c = fixture();
        let i = c.inspect("5$ en crypto via western union, secret");
        assert!(i.suspicious);
        assert_eq!(i.glyphs, vec!["$".to_string()]);
        assert_eq!(i.high_risk, vec!["western union".to_string()]);
        assert_eq!(i.keywords, vec!["crypto".to_string(), "secret".to_string()]);
        assert!(i.patterns.is_empty());
    }
}
