use serde::Serialize;

use crate::catalog::Category;

/// One of the two interchangeable classifiers.
///
/// Slot numbers are 1 and 2; "slot 0" (nothing selected) is `Option::None`
/// at the session level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ModelSlot {
    FaceShape,
    PersonalTone,
}

impl ModelSlot {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(ModelSlot::FaceShape),
            2 => Some(ModelSlot::PersonalTone),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            ModelSlot::FaceShape => 1,
            ModelSlot::PersonalTone => 2,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelSlot::FaceShape => "Face Type Analysis",
            ModelSlot::PersonalTone => "Personal Tone Analysis",
        }
    }

    /// Catalog category the slot's labels belong to.
    pub fn category(self) -> Category {
        match self {
            ModelSlot::FaceShape => Category::FaceType,
            ModelSlot::PersonalTone => Category::PersonalTone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_zero_is_unselected() {
        assert_eq!(ModelSlot::from_index(0), None);
        assert_eq!(ModelSlot::from_index(3), None);
        assert_eq!(ModelSlot::from_index(1), Some(ModelSlot::FaceShape));
        assert_eq!(ModelSlot::PersonalTone.index(), 2);
        assert_eq!(ModelSlot::PersonalTone.category(), Category::PersonalTone);
    }
}
