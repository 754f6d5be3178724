//! Tests for the chip selector.

use super::*;
use crate::domain::Group;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};

fn groups_selector() -> ChipSelector<Group> {
    let mut selector =
        ChipSelector::new(LookupConfig::new("id", "groupName")).with_label("Groups", "Add group...");
    selector.set_candidates(vec![
        Group::new(1, "Admins"),
        Group::new(2, "Editors"),
        Group::new(3, "Guests"),
    ]);
    selector
}

#[fixture]
fn selector() -> ChipSelector<Group> {
    groups_selector()
}

fn names(records: &[&Group]) -> Vec<String> {
    records.iter().map(|group| group.group_name.clone()).collect()
}

#[rstest]
fn empty_input_suggests_every_candidate(selector: ChipSelector<Group>) {
    assert_eq!(names(&selector.filtered()), ["Admins", "Editors", "Guests"]);
}

#[rstest]
#[case::lowercase("ed", &["Editors"])]
#[case::uppercase("ED", &["Editors"])]
#[case::shared_substring("s", &["Admins", "Editors", "Guests"])]
#[case::no_match("zz", &[])]
fn filtering_is_case_insensitive_substring(
    mut selector: ChipSelector<Group>,
    #[case] input: &str,
    #[case] expected: &[&str],
) {
    selector.set_input(input);
    assert_eq!(names(&selector.filtered()), expected);
}

#[rstest]
fn filter_by_record_uses_the_record_label(selector: ChipSelector<Group>) {
    let needle = Group::new(99, "dmin");
    assert_eq!(names(&selector.filter_by_record(&needle)), ["Admins"]);
}

#[rstest]
fn typed_label_is_committed_and_published(mut selector: ChipSelector<Group>) {
    let mut changes = selector.subscribe();
    selector.set_input("  Editors ");

    assert!(selector.commit_typed());
    assert_eq!(selector.selected(), [Group::new(2, "Editors")]);
    assert_eq!(selector.input(), "");
    assert_eq!(changes.try_recv().ok(), Some(vec![Group::new(2, "Editors")]));
}

#[rstest]
#[case::unknown_label("Owners")]
#[case::partial_label("Edit")]
#[case::blank("   ")]
fn unmatched_typed_text_is_dropped_silently(
    mut selector: ChipSelector<Group>,
    #[case] typed: &str,
) {
    let mut changes = selector.subscribe();
    selector.set_input(typed);

    assert!(!selector.commit_typed());
    assert!(selector.selected().is_empty());
    assert_eq!(selector.input(), "");
    assert!(changes.try_recv().is_err());
}

#[rstest]
fn typed_label_already_selected_is_ignored(mut selector: ChipSelector<Group>) {
    selector.set_selected(vec![Group::new(2, "Editors")]);
    selector.set_input("Editors");

    assert!(!selector.commit_typed());
    assert_eq!(selector.selected().len(), 1);
}

#[rstest]
fn typed_label_resolves_to_the_last_matching_candidate() {
    let mut selector = ChipSelector::new(LookupConfig::new("id", "groupName"));
    selector.set_candidates(vec![Group::new(1, "Ops"), Group::new(2, "Ops")]);
    selector.set_input("Ops");

    assert!(selector.commit_typed());
    assert_eq!(selector.selected(), [Group::new(2, "Ops")]);
}

#[rstest]
fn picking_deduplicates_by_identity(mut selector: ChipSelector<Group>) {
    let mut changes = selector.subscribe();
    selector.set_input("Gu");

    assert!(selector.commit_pick(Group::new(3, "Guests")));
    assert_eq!(selector.input(), "");
    assert_eq!(changes.try_recv().ok(), Some(vec![Group::new(3, "Guests")]));

    selector.set_input("Gu");
    assert!(!selector.commit_pick(Group::new(3, "Guests (renamed)")));
    assert_eq!(selector.selected().len(), 1);
    assert_eq!(selector.input(), "");
    assert!(changes.try_recv().is_err());
}

#[rstest]
#[case::newline('\n', true)]
#[case::comma(',', true)]
#[case::space(' ', false)]
#[case::semicolon(';', false)]
fn separator_keys_finish_a_chip(#[case] key: char, #[case] expected: bool) {
    assert_eq!(ChipSelector::<Group>::key_ends_entry(key), expected);
}

#[derive(Debug, Clone)]
struct Removal {
    removed: bool,
    remaining: Vec<Group>,
}

#[given("a selector holding Admins and Guests")]
fn selector_with_chips() -> ChipSelector<Group> {
    let mut selector = groups_selector();
    selector.set_selected(vec![Group::new(1, "Admins"), Group::new(3, "Guests")]);
    selector
}

#[when("a chip is removed")]
fn remove_chip(selector: ChipSelector<Group>, chip: Group) -> Removal {
    let mut selector = selector;
    let removed = selector.remove(&chip);
    Removal {
        removed,
        remaining: selector.selected().to_vec(),
    }
}

#[then("only the remaining chips are selected")]
fn remaining_chips(outcome: Removal, expected: Vec<Group>) {
    assert_eq!(outcome.remaining, expected);
}

#[rstest]
fn removing_a_selected_chip() {
    let outcome = remove_chip(selector_with_chips(), Group::new(1, "Admins"));
    assert!(outcome.removed);
    remaining_chips(outcome, vec![Group::new(3, "Guests")]);
}

#[rstest]
fn removing_an_unselected_chip_is_a_no_op() {
    let outcome = remove_chip(selector_with_chips(), Group::new(2, "Editors"));
    assert!(!outcome.removed);
    remaining_chips(outcome, vec![Group::new(1, "Admins"), Group::new(3, "Guests")]);
}

#[rstest]
fn removal_matches_on_identity_not_label() {
    let outcome = remove_chip(selector_with_chips(), Group::new(3, "renamed"));
    assert!(outcome.removed);
    remaining_chips(outcome, vec![Group::new(1, "Admins")]);
}

#[rstest]
fn removal_through_a_cloned_selector_reaches_the_listener() {
    let mut original = selector_with_chips();
    let mut changes = original.subscribe();

    let outcome = remove_chip(original.clone(), Group::new(3, "Guests"));
    assert!(outcome.removed);
    assert_eq!(changes.try_recv().ok(), Some(vec![Group::new(1, "Admins")]));
    assert_eq!(original.selected().len(), 2);
}
