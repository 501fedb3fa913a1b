use crate::models::{normalize_state_code, NewClient, STATE_CODES};
use crate::validation::{digits_only, format_phone};

const NUMBER_MAX_DIGITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Email,
    Phone,
    PostalCode,
    Street,
    Complement,
    Number,
    Neighborhood,
    City,
    State,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        FormField::Name,
        FormField::Email,
        FormField::Phone,
        FormField::PostalCode,
        FormField::Street,
        FormField::Complement,
        FormField::Number,
        FormField::Neighborhood,
        FormField::City,
        FormField::State,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Nome",
            FormField::Email => "Email",
            FormField::Phone => "Telefone",
            FormField::PostalCode => "Cep",
            FormField::Street => "Logradouro",
            FormField::Complement => "Complemento",
            FormField::Number => "Número",
            FormField::Neighborhood => "Bairro",
            FormField::City => "Cidade",
            FormField::State => "UF",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }
}

/// Values typed into the creation form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub postal_code: String,
    pub street: String,
    pub complement: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    /// Empty until a code is chosen
    pub state: String,
}

impl ClientForm {
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::PostalCode => &self.postal_code,
            FormField::Street => &self.street,
            FormField::Complement => &self.complement,
            FormField::Number => &self.number,
            FormField::Neighborhood => &self.neighborhood,
            FormField::City => &self.city,
            FormField::State => &self.state,
        }
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::PostalCode => &mut self.postal_code,
            FormField::Street => &mut self.street,
            FormField::Complement => &mut self.complement,
            FormField::Number => &mut self.number,
            FormField::Neighborhood => &mut self.neighborhood,
            FormField::City => &mut self.city,
            FormField::State => &mut self.state,
        }
    }

    /// Store a raw value, applying the field's input mask.
    ///
    /// The phone is masked, the number keeps digits only and the state is
    /// upper-cased. An unknown state code is kept so validation can flag it.
    pub fn set(&mut self, field: FormField, raw: &str) {
        let value = match field {
            FormField::Phone => format_phone(raw),
            FormField::Number => digits_only(raw, NUMBER_MAX_DIGITS),
            FormField::State => match normalize_state_code(raw) {
                Some(code) => code.to_string(),
                None => raw.trim().to_ascii_uppercase(),
            },
            _ => raw.to_string(),
        };
        *self.slot(field) = value;
    }

    pub fn push_char(&mut self, field: FormField, c: char) {
        let mut raw = self.value(field).to_string();
        raw.push(c);
        self.set(field, &raw);
    }

    pub fn pop_char(&mut self, field: FormField) {
        // Removing the last character of a mask would just be re-added, so
        // the phone drops its last digit instead.
        let raw = match field {
            FormField::Phone => {
                let mut digits = digits_only(&self.phone, usize::MAX);
                digits.pop();
                digits
            }
            _ => {
                let mut raw = self.value(field).to_string();
                raw.pop();
                raw
            }
        };
        self.set(field, &raw);
    }

    /// Step the state code through the fixed list. "None" sits between the
    /// last and the first code.
    pub fn cycle_state(&mut self, forward: bool) {
        let current = STATE_CODES.iter().position(|c| *c == self.state);
        let len = STATE_CODES.len();
        let next = match (current, forward) {
            (None, true) => Some(0),
            (None, false) => Some(len - 1),
            (Some(i), true) if i + 1 == len => None,
            (Some(i), true) => Some(i + 1),
            (Some(0), false) => None,
            (Some(i), false) => Some(i - 1),
        };
        self.state = next.map(|i| STATE_CODES[i].to_string()).unwrap_or_default();
    }

    pub fn to_new_client(&self) -> NewClient {
        NewClient {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            postal_code: self.postal_code.clone(),
            street: self.street.clone(),
            complement: self.complement.clone(),
            number: self.number.parse().ok(),
            neighborhood: self.neighborhood.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
        }
    }
}
