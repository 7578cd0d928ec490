use serde::{Deserialize, Serialize};

/// A single logged eating event, as stored in the durable snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub foods: Vec<String>,
    pub calories: i64,
    pub date: String,   // YYYY-MM-DD, kept verbatim
    pub user_id: String, // owner, not checked against any user store
}

/// Everything the caller supplies; the ledger assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeal {
    pub name: String,
    pub foods: Vec<String>,
    pub calories: i64,
    pub date: String,
    pub user_id: String,
}

impl NewMeal {
    pub(crate) fn with_id(self, id: String) -> Meal {
        Meal {
            id,
            name: self.name,
            foods: self.foods,
            calories: self.calories,
            date: self.date,
            user_id: self.user_id,
        }
    }
}
