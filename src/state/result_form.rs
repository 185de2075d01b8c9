use asc_api::result::{MatchResult, ValidationError};
use asc_api::{Match, Player};
use chrono::Local;

const MAX_FIELD_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Date,
    Time,
    Score(usize),
}

/// Date, time and per-player scores being typed for one match.
#[derive(Debug, Clone)]
pub struct ResultFormState {
    pub tournament_id: String,
    pub match_id: String,
    pub match_label: String,
    pub players: Vec<Player>,
    pub date: String,
    pub time: String,
    pub scores: Vec<String>,
    pub focus: usize,
    /// Set while the submission is in flight.
    pub submitting: bool,
    pub error: Option<String>,
}

impl ResultFormState {
    /// `None` when the match has nobody to score yet.
    pub fn open(tournament_id: &str, m: &Match, match_label: String) -> Option<Self> {
        if m.players.is_empty() {
            return None;
        }
        let scores = match m.score {
            Some((a, b)) => vec![a.to_string(), b.to_string()],
            None => vec![String::new(); m.players.len()],
        };
        Some(Self {
            tournament_id: tournament_id.to_string(),
            match_id: m.id.clone(),
            match_label,
            players: m.players.clone(),
            date: Local::now().format("%Y-%m-%d").to_string(),
            time: String::new(),
            scores: scores.into_iter().take(m.players.len()).collect(),
            focus: 0,
            submitting: false,
            error: None,
        })
    }

    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = vec![FormField::Date, FormField::Time];
        fields.extend((0..self.players.len()).map(FormField::Score));
        fields
    }

    pub fn focused(&self) -> FormField {
        self.fields()[self.focus.min(self.fields().len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn focus_prev(&mut self) {
        let n = self.fields().len();
        self.focus = (self.focus + n - 1) % n;
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Date => &self.date,
            FormField::Time => &self.time,
            FormField::Score(i) => self.scores.get(i).map(String::as_str).unwrap_or(""),
        }
    }

    fn value_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Date => Some(&mut self.date),
            FormField::Time => Some(&mut self.time),
            FormField::Score(i) => self.scores.get_mut(i),
        }
    }

    pub fn label(&self, field: FormField) -> String {
        match field {
            FormField::Date => "Date (YYYY-MM-DD)".to_string(),
            FormField::Time => "Time (HH:MM)".to_string(),
            FormField::Score(i) => format!(
                "Score {}",
                self.players.get(i).map(|p| p.name.as_str()).unwrap_or("?")
            ),
        }
    }

    pub fn push_char(&mut self, c: char) {
        if self.submitting || c.is_control() {
            return;
        }
        let field = self.focused();
        if let Some(value) = self.value_mut(field)
            && value.chars().count() < MAX_FIELD_LEN
        {
            value.push(c);
        }
        self.error = None;
    }

    pub fn pop_char(&mut self) {
        if self.submitting {
            return;
        }
        let field = self.focused();
        if let Some(value) = self.value_mut(field) {
            value.pop();
        }
        self.error = None;
    }

    pub fn validate(&self) -> Result<MatchResult, ValidationError> {
        MatchResult::parse(&self.date, &self.time, &self.players, &self.scores)
    }

    /// Who the typed scores put ahead, once a two-player form validates.
    pub fn outcome(&self) -> Option<String> {
        if self.players.len() != 2 {
            return None;
        }
        let result = self.validate().ok()?;
        let line = match result.leader() {
            Some(id) => {
                let name = self.players.iter().find(|p| p.id == id).map(|p| p.name.as_str());
                format!("Leader: {}", name.unwrap_or(id))
            }
            None => "Draw".to_string(),
        };
        Some(line)
    }
}
