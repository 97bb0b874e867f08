//! Fixed mapping from relief resources to the volunteer skill that
//! distributes them.

use relief_types::{Resource, Skill};

/// The skill a volunteer needs to deliver `resource`.
///
/// | Resource | Skill |
/// |----------|-------|
/// | food, water, blankets | logistics |
/// | medical supplies | medical |
/// | shelter kits | engineering |
pub const fn required_skill_for(resource: Resource) -> Skill {
    match resource {
        Resource::Food | Resource::Water | Resource::Blankets => Skill::Logistics,
        Resource::MedicalSupplies => Skill::Medical,
        Resource::ShelterKits => Skill::Engineering,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resource_has_a_skill() {
        for resource in Resource::ALL {
            let skill = required_skill_for(resource);
            assert!(Skill::ALL.contains(&skill));
        }
    }

    #[test]
    fn medical_supplies_need_medics() {
        assert_eq!(required_skill_for(Resource::MedicalSupplies), Skill::Medical);
        assert_eq!(required_skill_for(Resource::Food), Skill::Logistics);
        assert_eq!(required_skill_for(Resource::ShelterKits), Skill::Engineering);
    }
}
