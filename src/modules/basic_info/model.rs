use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BasicInfoModel {
    #[validate(length(max = 300, message = "Bio must be at most 300 characters"))]
    pub bio: Option<String>,
    #[validate(range(min = 13, max = 120, message = "Age must be between 13 and 120"))]
    pub age: Option<i16>,
    #[validate(length(max = 50, message = "Pronouns must be at most 50 characters"))]
    pub pronouns: Option<String>,
    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: Option<String>,
}

impl BasicInfoModel {
    /// Blank strings are stored as missing.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        BasicInfoModel {
            bio: clean(self.bio),
            age: self.age,
            pronouns: clean(self.pronouns),
            location: clean(self.location),
        }
    }
}
