use crate::model::{ALL_PARTICIPANTS, MemberSet, MemberSetExpr, ParticipantId, Roster};
use fxhash::{FxHashMap, FxHashSet};

/// Resolves participant and group names to sets of participant IDs
pub struct MemberSetResolver<'a> {
    participants: FxHashMap<&'a str, ParticipantId>,
    // Groups map group names to sets of participant IDs
    groups: FxHashMap<&'a str, FxHashSet<ParticipantId>>,
}

impl<'a> MemberSetResolver<'a> {
    pub fn new(roster: &Roster<'a>) -> Self {
        let participants: FxHashMap<&'a str, ParticipantId> = roster.iter().collect();
        let mut groups = FxHashMap::default();
        groups.insert(ALL_PARTICIPANTS, roster.ids().collect());

        Self {
            participants,
            groups,
        }
    }

    pub fn evaluate_and_register_group(
        &mut self,
        name: &'a str,
        expr: &MemberSetExpr<'a>,
    ) -> Option<MemberSet> {
        let members = self.evaluate_members(expr)?;
        self.register_group_members(name, members.iter());
        Some(members)
    }

    pub fn register_group_members<I>(&mut self, name: &'a str, members: I)
    where
        I: IntoIterator<Item = ParticipantId>,
    {
        self.groups.insert(name, members.into_iter().collect());
    }

    /// Members come back sorted, which is roster order.
    pub fn evaluate_members(&self, expr: &MemberSetExpr<'a>) -> Option<MemberSet> {
        let set = expr.evaluate(|name| self.resolve(name))?;
        let mut ordered: Vec<ParticipantId> = set.into_iter().collect();
        ordered.sort_unstable();
        Some(MemberSet::new(ordered))
    }

    pub fn participant_id(&self, name: &str) -> Option<ParticipantId> {
        self.participants.get(name).copied()
    }

    pub fn is_participant(&self, name: &str) -> bool {
        self.participants.contains_key(name)
    }

    pub fn is_group_defined(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.is_participant(name) || self.is_group_defined(name)
    }

    fn resolve(&self, name: &str) -> Option<FxHashSet<ParticipantId>> {
        if let Some(id) = self.participant_id(name) {
            let mut single = FxHashSet::default();
            single.insert(id);
            return Some(single);
        }
        self.groups.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemberSetOp;

    #[test]
    fn builtin_group_holds_every_participant() {
        let roster = Roster::try_new(["Alice", "Bob", "Carol"]).expect("roster");
        let resolver = MemberSetResolver::new(&roster);

        let everyone = resolver
            .evaluate_members(&MemberSetExpr::single(ALL_PARTICIPANTS))
            .expect("evaluates");
        assert_eq!(
            everyone.members(),
            &[ParticipantId(0), ParticipantId(1), ParticipantId(2)]
        );
    }

    #[test]
    fn registered_group_can_be_referenced_later() {
        let roster = Roster::try_new(["Alice", "Bob", "Carol"]).expect("roster");
        let mut resolver = MemberSetResolver::new(&roster);

        let friends = MemberSetExpr::new(vec![
            MemberSetOp::Push("Carol"),
            MemberSetOp::Push("Alice"),
            MemberSetOp::Union,
        ]);
        resolver
            .evaluate_and_register_group("friends", &friends)
            .expect("group evaluates");

        let without_alice = MemberSetExpr::new(vec![
            MemberSetOp::Push("friends"),
            MemberSetOp::Push("Alice"),
            MemberSetOp::Difference,
        ]);
        let members = resolver.evaluate_members(&without_alice).expect("evaluates");
        assert_eq!(members.members(), &[ParticipantId(2)]);
        assert!(resolver.is_group_defined("friends"));
        assert!(!resolver.is_participant("friends"));
    }
}
