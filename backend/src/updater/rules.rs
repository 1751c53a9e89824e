//! Fixed pairwise relation rules between detected entity kinds.
//!
//! When an image contains entities of two related kinds, these rules
//! prescribe the triple to record without asking the AI. Rules are
//! directional: the first kind is the head of the triple.

use crate::models::relations;
use crate::models::EntityKind;

/// (head kind, tail kind, relation) rules applied between co-detected entities.
pub const KIND_RULES: [(EntityKind, EntityKind, &str); 3] = [
    (
        EntityKind::Insect,
        EntityKind::DiseaseSymptom,
        relations::TRANSMITS,
    ),
    (
        EntityKind::Tree,
        EntityKind::DiseaseSymptom,
        relations::SUSCEPTIBLE_TO,
    ),
    (EntityKind::Insect, EntityKind::Tree, relations::HOSTED_BY),
];

/// Relation a fixed rule prescribes for the ordered kind pair, if any.
pub fn rule_relation(head: EntityKind, tail: EntityKind) -> Option<&'static str> {
    KIND_RULES
        .iter()
        .find(|(h, t, _)| *h == head && *t == tail)
        .map(|(_, _, relation)| *relation)
}
