use crate::fields::title_case;

pub const STATE_SUGGESTION_LIMIT: usize = 6;

pub const US_STATES: [&str; 50] = [
    "Alabama",
    "Alaska",
    "Arizona",
    "Arkansas",
    "California",
    "Colorado",
    "Connecticut",
    "Delaware",
    "Florida",
    "Georgia",
    "Hawaii",
    "Idaho",
    "Illinois",
    "Indiana",
    "Iowa",
    "Kansas",
    "Kentucky",
    "Louisiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Mississippi",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Hampshire",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Carolina",
    "North Dakota",
    "Ohio",
    "Oklahoma",
    "Oregon",
    "Pennsylvania",
    "Rhode Island",
    "South Carolina",
    "South Dakota",
    "Tennessee",
    "Texas",
    "Utah",
    "Vermont",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
];

/// USPS codes, in the same order as `US_STATES`.
const STATE_CODES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY",
];

pub fn is_us_state(value: &str) -> bool {
    let value = value.trim();
    US_STATES.iter().any(|state| state.eq_ignore_ascii_case(value))
}

/// Full state name for a two-letter code, e.g. `tx` -> `Texas`.
pub fn expand_state_code(code: &str) -> Option<&'static str> {
    let code = code.trim();
    STATE_CODES
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(code))
        .map(|idx| US_STATES[idx])
}

/// Up to six states whose names start with the input; the first six states
/// when the input is blank or nothing matches.
pub fn state_suggestions(value: &str) -> Vec<&'static str> {
    let prefix = value.trim().to_lowercase();
    if prefix.is_empty() {
        return US_STATES.iter().take(STATE_SUGGESTION_LIMIT).copied().collect();
    }

    let matches: Vec<&'static str> = US_STATES
        .iter()
        .filter(|state| state.to_lowercase().starts_with(&prefix))
        .take(STATE_SUGGESTION_LIMIT)
        .copied()
        .collect();

    if matches.is_empty() {
        US_STATES.iter().take(STATE_SUGGESTION_LIMIT).copied().collect()
    } else {
        matches
    }
}

/// Title-cases the input and completes it to the first state it prefixes.
/// Input that prefixes no state is returned title-cased.
pub fn autocomplete_state(value: &str) -> String {
    let normalized = title_case(value);
    if normalized.is_empty() {
        return normalized;
    }

    let lowered = normalized.to_lowercase();
    US_STATES
        .iter()
        .find(|state| state.to_lowercase().starts_with(&lowered))
        .map(|state| state.to_string())
        .unwrap_or(normalized)
}
