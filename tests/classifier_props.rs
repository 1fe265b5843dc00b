use proptest::prelude::*;

use scamguard::antiscam::classifier::{Classifier, MIN_CHARS};
use scamguard::antiscam::lexicon::Lexicon;

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

proptest! {
    #[test]
    fn short_texts_are_never_flagged(s in ".{0,2}") {
        prop_assume!(s.chars().count() < MIN_CHARS);
        let c = Classifier::new(Lexicon::default()).unwrap();
        prop_assert!(!c.classify(&s));
    }

    #[test]
    fn any_text_with_currency_glyph_is_flagged(
        prefix in "[a-z ]{0,20}",
        glyph in prop::sample::select(vec!["€", "$"]),
        suffix in "[a-z ]{2,20}",
    ) {
        let text = format!("{prefix}{glyph}{suffix}");
        prop_assert!(fixture().classify(&text));
    }

    #[test]
    fn inspect_agrees_with_classify(s in "\\PC{0,80}") {
        let c = Classifier::new(Lexicon::default()).unwrap();
        prop_assert_eq!(c.inspect(&s).suspicious, c.classify(&s));
    }

    #[test]
    fn single_tier2_keyword_is_not_enough(
        kw in prop::sample::select(vec!["crypto", "wallet", "secret"]),
        filler in "[b-d ]{3,20}",
    ) {
        let c = fixture();
        let text = format!("{filler} {kw} {filler}");
        prop_assert!(!c.classify(&text));
    }

    #[test]
    fn two_tier2_keywords_trip_threshold(
        pair in prop::sample::select(vec![("crypto", "wallet"), ("wallet", "secret"), ("secret", "crypto")]),
        filler in "[b-d ]{0,10}",
    ) {
        let c = fixture();
        let text = format!("{} {filler} {}", pair.0, pair.1);
        prop_assert!(c.classify(&text));
    }
}
