//! Row, payload and filter types shared by the store, the search engine and
//! the UI.

/// Storage format of the `birthday` column and of full-birthday input.
pub const BIRTHDAY_FORMAT: &str = "%d-%m-%Y";

/// One row of the `persons` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// `"dd-mm-yyyy"`, absent when unknown.
    pub birthday: Option<String>,
    pub is_favourite: bool,
}

/// One row of the `phones` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone {
    pub id: i64,
    /// Owning person id; every phone has exactly one owner.
    pub owner: i64,
    pub number: String,
    pub description: Option<String>,
}

/// Payload for inserting a person (the id is assigned by the store).
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<String>,
    pub is_favourite: bool,
}

/// Payload for inserting a phone; the owner id is supplied separately.
#[derive(Debug, Clone)]
pub struct NewPhone {
    pub number: String,
    pub description: Option<String>,
}

/// Partial person update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PersonPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<String>,
    pub is_favourite: Option<bool>,
}

/// Partial phone update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PhonePatch {
    pub owner: Option<i64>,
    pub number: Option<String>,
    pub description: Option<String>,
}

/// Sparse search parameters. Absent fields do not constrain the result.
///
/// The first nine map to SQL predicates on the joined tables; the age
/// bounds and the nearest-birthday flag are applied in memory after the
/// query because they derive from "today".
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub person_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Day-month prefix, `"dd-mm"`; matches any year.
    pub birthday_prefix: Option<String>,
    pub is_favourite: Option<bool>,
    pub phone_id: Option<i64>,
    pub phone_owner: Option<i64>,
    pub number: Option<String>,
    pub description: Option<String>,
    pub age_from: Option<u32>,
    pub age_to: Option<u32>,
    /// Keep only rows whose birthday falls within the next 30 days.
    pub nearest_birthday: bool,
}

impl SearchFilter {
    /// Filter backing the upcoming-birthdays view.
    pub fn nearest_birthdays() -> Self {
        Self {
            nearest_birthday: true,
            ..Self::default()
        }
    }
}

/// One joined person+phone result row. A person with several phones yields
/// several rows sharing the person columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub person_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<String>,
    pub is_favourite: bool,
    pub phone_id: i64,
    pub number: String,
    pub description: Option<String>,
    /// Whole years old as of the search, when a birthday is on file.
    pub age_years: Option<i32>,
}

impl ContactRow {
    /// Birthday column as shown in the result table: the stored date with
    /// the computed age on a second line.
    pub fn birthday_display(&self) -> String {
        match (&self.birthday, self.age_years) {
            (Some(birthday), Some(age)) => format!("{birthday}\n({age} years)"),
            (Some(birthday), None) => birthday.clone(),
            (None, _) => String::new(),
        }
    }
}
