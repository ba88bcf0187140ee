//! Static skeleton description: which parts exist, how they parent, and
//! which of them are constrained (fitted with anchor joints outside full
//! ragdoll).
//!
//! One layout type serves both rig kinds: the fixed 11-part humanoid and
//! generic chains of any length. The state machine is written once against
//! this abstraction.

use crate::error::RagdollError;

/// Humanoid body part slots, in their fixed array order.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanBodyPart {
    Spine = 0,
    Chest,
    Head,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
}

/// Number of parts in the humanoid rig.
pub const HUMANOID_PART_COUNT: usize = 11;

impl HumanBodyPart {
    /// Array index of this part.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One part's static description.
#[derive(Debug, Clone)]
pub struct PartDef {
    pub name: String,
    /// Parent part index. `None` only for the root (index 0).
    pub parent: Option<usize>,
}

/// Static description of a rig: named parts, hierarchy, constrained set.
#[derive(Debug, Clone)]
pub struct SkeletonLayout {
    parts: Vec<PartDef>,
    constrained: Vec<usize>,
}

impl SkeletonLayout {
    /// Build a layout from explicit part definitions. Parts must be listed
    /// root-first: index 0 is the root and every parent index must precede
    /// its child.
    pub fn generic(parts: Vec<PartDef>, constrained: Vec<usize>) -> Result<Self, RagdollError> {
        if parts.is_empty() {
            return Err(RagdollError::InvalidLayout("no parts defined".into()));
        }
        if parts[0].parent.is_some() {
            return Err(RagdollError::InvalidLayout(
                "root part (index 0) must not have a parent".into(),
            ));
        }
        for (i, part) in parts.iter().enumerate().skip(1) {
            match part.parent {
                None => {
                    return Err(RagdollError::InvalidLayout(format!(
                        "part {} ({}) has no parent; only the root may be parentless",
                        i, part.name
                    )))
                }
                Some(p) if p >= i => {
                    return Err(RagdollError::InvalidLayout(format!(
                        "part {} ({}) lists parent {} which does not precede it",
                        i, part.name, p
                    )))
                }
                Some(_) => {}
            }
        }
        for &c in &constrained {
            if c >= parts.len() {
                return Err(RagdollError::InvalidLayout(format!(
                    "constrained index {} out of range ({} parts)",
                    c,
                    parts.len()
                )));
            }
        }
        Ok(Self { parts, constrained })
    }

    /// The fixed humanoid rig: spine root, chest/head chain, two arms, two
    /// legs; knees constrained.
    pub fn humanoid() -> Self {
        use HumanBodyPart::*;
        let def = |name: &str, parent: Option<HumanBodyPart>| PartDef {
            name: name.to_string(),
            parent: parent.map(|p| p.index()),
        };
        let parts = vec![
            def("spine", None),
            def("chest", Some(Spine)),
            def("head", Some(Chest)),
            def("left_shoulder", Some(Chest)),
            def("right_shoulder", Some(Chest)),
            def("left_elbow", Some(LeftShoulder)),
            def("right_elbow", Some(RightShoulder)),
            def("left_hip", Some(Spine)),
            def("right_hip", Some(Spine)),
            def("left_knee", Some(LeftHip)),
            def("right_knee", Some(RightHip)),
        ];
        let constrained = vec![LeftKnee.index(), RightKnee.index()];
        // Hand-built table, cannot fail validation.
        Self::generic(parts, constrained).expect("humanoid layout is well formed")
    }

    /// Number of parts.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Name of a part.
    pub fn name(&self, index: usize) -> &str {
        &self.parts[index].name
    }

    /// Parent index of a part (`None` for the root).
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parts[index].parent
    }

    /// Indices of constrained parts (knees in the humanoid rig).
    pub fn constrained(&self) -> &[usize] {
        &self.constrained
    }

    /// Whether an index belongs to the constrained set.
    pub fn is_constrained(&self, index: usize) -> bool {
        self.constrained.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanoid_layout_shape() {
        let layout = SkeletonLayout::humanoid();
        assert_eq!(layout.part_count(), HUMANOID_PART_COUNT);
        assert_eq!(layout.parent(HumanBodyPart::Spine.index()), None);
        assert_eq!(
            layout.parent(HumanBodyPart::LeftKnee.index()),
            Some(HumanBodyPart::LeftHip.index())
        );
        assert_eq!(
            layout.constrained(),
            &[HumanBodyPart::LeftKnee.index(), HumanBodyPart::RightKnee.index()]
        );
    }

    #[test]
    fn generic_rejects_empty() {
        assert!(matches!(
            SkeletonLayout::generic(vec![], vec![]),
            Err(RagdollError::InvalidLayout(_))
        ));
    }

    #[test]
    fn generic_rejects_rooted_parent() {
        let parts = vec![PartDef {
            name: "root".into(),
            parent: Some(0),
        }];
        assert!(SkeletonLayout::generic(parts, vec![]).is_err());
    }

    #[test]
    fn generic_rejects_forward_parent() {
        let parts = vec![
            PartDef { name: "root".into(), parent: None },
            PartDef { name: "a".into(), parent: Some(2) },
            PartDef { name: "b".into(), parent: Some(0) },
        ];
        assert!(SkeletonLayout::generic(parts, vec![]).is_err());
    }

    #[test]
    fn generic_rejects_bad_constrained_index() {
        let parts = vec![
            PartDef { name: "root".into(), parent: None },
            PartDef { name: "a".into(), parent: Some(0) },
        ];
        assert!(SkeletonLayout::generic(parts, vec![5]).is_err());
    }

    #[test]
    fn generic_chain_accepted() {
        let parts = (0..4)
            .map(|i| PartDef {
                name: format!("seg_{i}"),
                parent: if i == 0 { None } else { Some(i - 1) },
            })
            .collect();
        let layout = SkeletonLayout::generic(parts, vec![3]).unwrap();
        assert_eq!(layout.part_count(), 4);
        assert!(layout.is_constrained(3));
        assert!(!layout.is_constrained(1));
    }
}
