use chrono::{DateTime, Utc};

use crate::firestore::{FieldValue, Fields, TENANT_FIELD};

/// `muscle_group` value marking a cardio entry
pub const CARDIO_MARKER: &str = "有酸素";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutSet {
    pub reps: u32,
    /// Kilograms, or minutes for cardio entries
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub name: String,
    pub sets: Vec<WorkoutSet>,
}

/// Training log stored in `workoutLogs`
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutLog {
    pub gym_id: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub muscle_group: String,
    pub exercises: Vec<Exercise>,
    pub notes: String,
}

impl WorkoutLog {
    pub fn is_cardio(&self) -> bool {
        self.muscle_group == CARDIO_MARKER
    }

    pub fn to_fields(&self) -> Fields {
        let exercises: Vec<FieldValue> = self
            .exercises
            .iter()
            .map(|exercise| {
                let sets: Vec<FieldValue> = exercise
                    .sets
                    .iter()
                    .map(|set| {
                        let mut s = Fields::new();
                        s.insert("reps".into(), set.reps.into());
                        s.insert("weight".into(), set.weight.into());
                        FieldValue::Map(s)
                    })
                    .collect();

                let mut e = Fields::new();
                e.insert("name".into(), exercise.name.as_str().into());
                e.insert("sets".into(), FieldValue::Array(sets));
                FieldValue::Map(e)
            })
            .collect();

        let mut fields = Fields::new();
        fields.insert("userId".into(), self.user_id.as_str().into());
        fields.insert(TENANT_FIELD.into(), self.gym_id.as_str().into());
        fields.insert("date".into(), self.date.into());
        fields.insert("muscle_group".into(), self.muscle_group.as_str().into());
        fields.insert("exercises".into(), FieldValue::Array(exercises));
        fields.insert("notes".into(), self.notes.as_str().into());
        fields.insert("createdAt".into(), self.date.into());
        fields
    }
}
