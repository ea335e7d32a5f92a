use crate::settlement_presenter::format_participant_label;
use std::fmt::Write as _;
use tallyup_application::{GroupMembers, ParticipantDirectory};
use tallyup_i18n as i18n;

pub struct GroupsPresenter;

impl GroupsPresenter {
    /// One `- name := members` line per group, in declaration order.
    pub fn render(groups: &[GroupMembers<'_>], directory: &dyn ParticipantDirectory) -> String {
        if groups.is_empty() {
            return format!("{}\n", i18n::NO_GROUPS);
        }

        let mut reply = String::with_capacity(64 * groups.len());
        for group in groups {
            let listing = if group.members.is_empty() {
                "[empty]".to_string()
            } else {
                group
                    .members
                    .iter()
                    .map(|id| format_participant_label(*id, directory))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let _ = writeln!(&mut reply, "- {} := {listing}", group.name);
        }
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallyup_domain::{ParticipantId, Roster};

    #[test]
    fn lists_members_by_name() {
        let roster = Roster::try_new(["Alice", "Bob", "Carol"]).expect("roster");
        let groups = [
            GroupMembers {
                name: "friends",
                members: vec![ParticipantId(0), ParticipantId(2)],
            },
            GroupMembers {
                name: "nobody",
                members: Vec::new(),
            },
        ];

        let rendered = GroupsPresenter::render(&groups, &roster);

        assert_eq!(rendered, "- friends := Alice, Carol\n- nobody := [empty]\n");
    }

    #[test]
    fn empty_listing_says_so() {
        let roster = Roster::try_new(["Alice"]).expect("roster");
        let rendered = GroupsPresenter::render(&[], &roster);
        assert_eq!(rendered, format!("{}\n", i18n::NO_GROUPS));
    }
}
