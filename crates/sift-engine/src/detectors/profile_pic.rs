//! Profile-picture presence.

use super::{QueryText, Rule, first_match};
use crate::vocab::IMAGE_WORDS;

const ABSENT_INDICATORS: &[&str] = &[
    "without pic",
    "without photo",
    "without profile",
    "without avatar",
    "without image",
    "no pic",
    "no photo",
    "no profile",
    "no avatar",
    "no image",
    "missing pic",
    "missing photo",
    "missing profile",
    "missing avatar",
    "don't have pic",
    "don't have photo",
    "doesn't have pic",
    "doesn't have photo",
    "do not have pic",
    "do not have photo",
    "do not have profile",
    "do not have avatar",
    "does not have pic",
    "does not have photo",
    "does not have profile",
    "does not have avatar",
    "w/o pic",
    "w/o photo",
    "w/o profile",
    "w/o avatar",
];

const PRESENT_INDICATORS: &[&str] = &[
    "with pic",
    "with photo",
    "with profile",
    "with avatar",
    "with image",
    "has pic",
    "has photo",
    "has avatar",
    "have pic",
    "have photo",
    "have avatar",
    "got pic",
    "got photo",
    "got avatar",
    "profile pic",
    "profile photo",
];

/// Absence is checked before presence: "no profile picture" also contains
/// "profile pic".
pub const PROFILE_PIC_RULES: &[Rule<bool>] = &[
    Rule {
        name: "absent",
        matcher: absent,
    },
    Rule {
        name: "present",
        matcher: present,
    },
];

/// `Some(true)` = must have a picture, `Some(false)` = must not.
pub fn detect_profile_pic(query: &QueryText<'_>) -> Option<bool> {
    if !mentions_picture(query) {
        return None;
    }
    first_match(PROFILE_PIC_RULES, query, &()).map(|(_, wanted)| wanted)
}

fn mentions_picture(q: &QueryText<'_>) -> bool {
    q.contains("profile") || IMAGE_WORDS.iter().any(|w| q.contains(w))
}

// Indicators are prefixes ("no pic" covers "no pictures").
fn absent(q: &QueryText<'_>, _: &()) -> Option<bool> {
    ABSENT_INDICATORS
        .iter()
        .any(|i| q.contains(i))
        .then_some(false)
}

fn present(q: &QueryText<'_>, _: &()) -> Option<bool> {
    PRESENT_INDICATORS
        .iter()
        .any(|i| q.contains(i))
        .then_some(true)
}
