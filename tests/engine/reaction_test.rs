//! Masking, contradiction verdicts, and reaction text.

use masquerade::catalog::MaskStyle;
use masquerade::engine::contradiction::{detect, Rationale};
use masquerade::engine::reaction::{
    mask, public_openers, PhraseChooser, SeededChooser, PUBLIC_NEGATIVE_OPENERS,
    PUBLIC_NEUTRAL_OPENERS, PUBLIC_POSITIVE_OPENERS,
};
use masquerade::types::{Sentiment, Unit};

fn s(value: f64) -> Sentiment {
    Sentiment::new(value)
}

#[test]
fn reveal_passes_sentiment_through_at_any_strength() {
    for strength in [0.0, 0.5, 1.0] {
        for value in [-0.8, 0.0, 0.6] {
            assert_eq!(mask(s(value), &MaskStyle::Reveal, Unit::new(strength)), s(value));
        }
    }
}

#[test]
fn unrecognised_style_behaves_like_reveal() {
    let style = MaskStyle::Unrecognized("sulk".to_owned());
    assert_eq!(mask(s(-0.4), &style, Unit::ONE), s(-0.4));
}

#[test]
fn full_switch_inverts_exactly() {
    for value in [-1.0, -0.3, 0.0, 0.45, 1.0] {
        let public = mask(s(value), &MaskStyle::Switch, Unit::ONE);
        assert_eq!(public.get(), -value);
    }
}

#[test]
fn weak_switch_inverts_at_half_strength() {
    let public = mask(s(0.8), &MaskStyle::Switch, Unit::ZERO);
    assert!((public.get() + 0.4).abs() < 1e-12);
}

#[test]
fn mask_attenuates_toward_neutral() {
    let public = mask(s(-0.5), &MaskStyle::Mask, Unit::new(0.5));
    assert!((public.get() + 0.2).abs() < 1e-12);

    let silenced = mask(s(0.9), &MaskStyle::Mask, Unit::new(0.9));
    assert_eq!(silenced.get(), 0.0);
}

#[test]
fn strong_mask_turns_dislike_into_mild_approval() {
    let public = mask(s(-0.7), &MaskStyle::Mask, Unit::new(0.7));
    assert!((public.get() - 0.2).abs() < 1e-12);

    let slight = mask(s(-0.2), &MaskStyle::Mask, Unit::ONE);
    assert!((slight.get() - 0.1).abs() < 1e-12);
}

#[test]
fn strong_mask_leaves_faint_dislike_attenuated() {
    // At or above -0.10 the override does not apply.
    let public = mask(s(-0.1), &MaskStyle::Mask, Unit::ONE);
    assert_eq!(public.get(), 0.0);
}

#[test]
fn detect_rationales_follow_priority() {
    let weak = Unit::new(0.3);
    let strong = Unit::new(0.9);

    assert_eq!(detect(s(0.6), s(-0.3), weak).rationale, Rationale::Opposes);
    assert_eq!(detect(s(0.6), s(0.0), strong).rationale, Rationale::Neutralizes);
    assert_eq!(detect(s(0.6), s(0.0), weak).rationale, Rationale::Downplays);
    assert_eq!(detect(s(0.6), s(0.5), weak).rationale, Rationale::Aligns);

    assert!(detect(s(0.6), s(0.0), weak).contradiction);
    assert!(!detect(s(0.6), s(0.5), strong).contradiction);
}

#[test]
fn tiny_opposite_signs_are_not_opposition() {
    let verdict = detect(s(0.1), s(-0.1), Unit::ZERO);
    assert_eq!(verdict.rationale, Rationale::Aligns);
}

#[test]
fn public_buckets_split_at_threshold() {
    assert_eq!(public_openers(s(0.15)), PUBLIC_POSITIVE_OPENERS);
    assert_eq!(public_openers(s(0.149)), PUBLIC_NEUTRAL_OPENERS);
    assert_eq!(public_openers(s(-0.149)), PUBLIC_NEUTRAL_OPENERS);
    assert_eq!(public_openers(s(-0.15)), PUBLIC_NEGATIVE_OPENERS);
}

#[test]
fn seeded_chooser_repeats_its_sequence() {
    let a = SeededChooser::new(7);
    let b = SeededChooser::new(7);
    let first: Vec<usize> = (0..16).map(|_| a.choose(4)).collect();
    let second: Vec<usize> = (0..16).map(|_| b.choose(4)).collect();
    assert_eq!(first, second);
    assert!(first.iter().all(|i| *i < 4));
}
