//! Editor form definitions and commit handlers.
//!
//! A form is a fixed grid of labelled fields, each tied to the checker that
//! validates raw input for that cell. Committing a form turns the validated
//! cells into store calls; required fields are marked `(*)` in their label.

use phonebook_common::{
    ContactRow, ContactStore, FieldKind, FieldValue, NewPerson, NewPhone, PersonPatch, PhonePatch,
    SearchFilter, StoreError,
};
use thiserror::Error;

/// Why a form could not be committed. The messages are user-facing.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("this person name already exists")]
    DuplicateName,
    #[error("make sure to fill the required fields (*)")]
    MissingRequired,
    #[error("no person with id {0}")]
    NoSuchOwner(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Search,
    NewRecord,
    NewPhone,
    UpdatePerson,
    UpdatePhone,
}

impl FormKind {
    pub fn title(self) -> &'static str {
        match self {
            FormKind::Search => "SEARCH PARAMS",
            FormKind::NewRecord => "NEW RECORD",
            FormKind::NewPhone => "NEW PHONE",
            FormKind::UpdatePerson => "UPDATE PERSON",
            FormKind::UpdatePhone => "UPDATE PHONE",
        }
    }

    pub fn fields(self) -> &'static [(&'static str, FieldKind)] {
        match self {
            FormKind::Search => &[
                ("ID", FieldKind::Integer),
                ("First Name", FieldKind::Name),
                ("Last Name", FieldKind::Name),
                ("Birthday (day-month)", FieldKind::BirthdayShort),
                ("Age", FieldKind::Age),
                ("Favourite", FieldKind::Boolean),
                ("Phone", FieldKind::PhoneNumber),
                ("Description", FieldKind::FreeText),
            ],
            FormKind::NewRecord => &[
                ("First Name(*)", FieldKind::Name),
                ("Last Name(*)", FieldKind::Name),
                ("Birthday", FieldKind::BirthdayFull),
                ("Favourite", FieldKind::Boolean),
                ("Phone(*)", FieldKind::PhoneNumber),
                ("Description", FieldKind::FreeText),
            ],
            FormKind::NewPhone => &[
                ("Phone(*)", FieldKind::PhoneNumber),
                ("Description", FieldKind::FreeText),
            ],
            FormKind::UpdatePerson => &[
                ("First Name", FieldKind::Name),
                ("Last Name", FieldKind::Name),
                ("Birthday", FieldKind::BirthdayFull),
                ("Favourite", FieldKind::Boolean),
            ],
            FormKind::UpdatePhone => &[
                ("Owner ID", FieldKind::Integer),
                ("Phone", FieldKind::PhoneNumber),
                ("Description", FieldKind::FreeText),
            ],
        }
    }
}

/// One editor grid: the entered cells plus, for update forms, the row the
/// edit started from (shown as a reference line).
#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub cells: Vec<Option<FieldValue>>,
    pub reference: Vec<String>,
}

impl Form {
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            cells: vec![None; kind.fields().len()],
            reference: Vec::new(),
        }
    }

    /// Form pre-populated with the selected row's current values as the
    /// reference line.
    pub fn for_row(kind: FormKind, row: &ContactRow) -> Self {
        let mut form = Self::new(kind);
        form.reference = match kind {
            FormKind::UpdatePerson => vec![
                row.first_name.clone(),
                row.last_name.clone(),
                row.birthday.clone().unwrap_or_default(),
                favourite_mark(row.is_favourite),
            ],
            FormKind::UpdatePhone => vec![
                row.person_id.to_string(),
                row.number.clone(),
                row.description.clone().unwrap_or_default(),
            ],
            _ => Vec::new(),
        };
        form
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells = vec![None; self.len()];
    }

    pub fn cell_display(&self, index: usize) -> String {
        self.cells[index]
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    fn text(&self, index: usize) -> Option<String> {
        self.cells[index]
            .as_ref()
            .and_then(|v| v.as_text())
            .map(str::to_string)
    }

    fn int(&self, index: usize) -> Option<i64> {
        self.cells[index].as_ref().and_then(FieldValue::as_int)
    }

    fn flag(&self, index: usize) -> Option<bool> {
        self.cells[index].as_ref().and_then(FieldValue::as_bool)
    }

    fn age(&self, index: usize) -> Option<(u32, u32)> {
        self.cells[index].as_ref().and_then(FieldValue::as_age_range)
    }
}

fn favourite_mark(is_favourite: bool) -> String {
    if is_favourite { "*".into() } else { String::new() }
}

/// Turn the committed search form into the filter the main table reloads
/// with. Cells are already validated, so this cannot fail.
pub fn build_search_filter(form: &Form) -> SearchFilter {
    debug_assert_eq!(form.kind, FormKind::Search);
    let (age_from, age_to) = form.age(4).unzip();
    SearchFilter {
        person_id: form.int(0),
        first_name: form.text(1),
        last_name: form.text(2),
        birthday_prefix: form.text(3),
        age_from,
        age_to,
        is_favourite: form.flag(5),
        number: form.text(6),
        description: form.text(7),
        ..SearchFilter::default()
    }
}

/// Insert a new person together with their first phone.
pub fn commit_new_record(form: &Form, store: &ContactStore) -> Result<(), CommitError> {
    let (Some(first_name), Some(last_name), Some(number)) =
        (form.text(0), form.text(1), form.text(4))
    else {
        return Err(CommitError::MissingRequired);
    };
    if store.name_exists(&first_name, &last_name)? {
        return Err(CommitError::DuplicateName);
    }
    store.insert_record(
        &NewPerson {
            first_name,
            last_name,
            birthday: form.text(2),
            is_favourite: form.flag(3).unwrap_or(false),
        },
        &NewPhone {
            number,
            description: form.text(5),
        },
    )?;
    Ok(())
}

/// Insert another phone for the selected row's person.
pub fn commit_new_phone(form: &Form, store: &ContactStore, owner: i64) -> Result<(), CommitError> {
    let Some(number) = form.text(0) else {
        return Err(CommitError::MissingRequired);
    };
    store.insert_phone(
        owner,
        &NewPhone {
            number,
            description: form.text(1),
        },
    )?;
    Ok(())
}

/// Apply the filled cells to the selected row's person; empty cells mean
/// "no change". Rejects a resulting name that another person already has.
pub fn commit_update_person(
    form: &Form,
    store: &ContactStore,
    row: &ContactRow,
) -> Result<(), CommitError> {
    let patch = PersonPatch {
        first_name: form.text(0),
        last_name: form.text(1),
        birthday: form.text(2),
        is_favourite: form.flag(3),
    };
    let first = patch.first_name.as_deref().unwrap_or(&row.first_name);
    let last = patch.last_name.as_deref().unwrap_or(&row.last_name);
    if (first, last) != (row.first_name.as_str(), row.last_name.as_str())
        && store.name_exists(first, last)?
    {
        return Err(CommitError::DuplicateName);
    }
    store.update_person(row.person_id, &patch)?;
    Ok(())
}

/// Apply the filled cells to the selected row's phone; a new owner id must
/// name an existing person.
pub fn commit_update_phone(
    form: &Form,
    store: &ContactStore,
    row: &ContactRow,
) -> Result<(), CommitError> {
    let patch = PhonePatch {
        owner: form.int(0),
        number: form.text(1),
        description: form.text(2),
    };
    if let Some(owner) = patch.owner {
        if !store.person_exists(owner)? {
            return Err(CommitError::NoSuchOwner(owner));
        }
    }
    store.update_phone(row.phone_id, &patch)?;
    Ok(())
}
