//! Update semantics for patient records
//!
//! Full replace overwrites every field except the id. Partial patch overwrites
//! only the fields present in the patch; `None` means "leave unchanged" while
//! `Some("")` is a real value (used to clear `complement`).
//!
//! Payloads are validated before they reach this module; nothing here fails.

use crate::{FlagsPatch, Patient, PatientPatch};

/// Replace every field of `existing` with `incoming`, keeping the stored id.
pub fn apply_full_replace(existing: &Patient, incoming: Patient) -> Patient {
    Patient {
        id: existing.id,
        ..incoming
    }
}

/// Overwrite the fields of `existing` that are present in `patch`.
pub fn apply_partial_patch(existing: Patient, patch: &PatientPatch) -> Patient {
    let mut merged = existing;

    if let Some(identity_number) = &patch.identity_number {
        merged.identity_number = identity_number.clone();
    }
    if let Some(full_name) = &patch.full_name {
        merged.full_name = full_name.clone();
    }
    if let Some(birth_date) = patch.birth_date {
        merged.birth_date = birth_date;
    }
    if let Some(mother_name) = &patch.mother_name {
        merged.mother_name = mother_name.clone();
    }
    if let Some(postal_code) = &patch.postal_code {
        merged.postal_code = postal_code.clone();
    }
    if let Some(street) = &patch.street {
        merged.street = street.clone();
    }
    if let Some(street_number) = &patch.street_number {
        merged.street_number = street_number.clone();
    }
    // "" clears the complement
    if let Some(complement) = &patch.complement {
        merged.complement = complement.clone();
    }
    if let Some(neighborhood) = &patch.neighborhood {
        merged.neighborhood = neighborhood.clone();
    }
    if let Some(city) = &patch.city {
        merged.city = city.clone();
    }
    if let Some(state) = &patch.state {
        merged.state = state.clone();
    }
    if let Some(mobile_phone) = &patch.mobile_phone {
        merged.mobile_phone = mobile_phone.clone();
    }
    if let Some(guardian_phone) = &patch.guardian_phone {
        merged.guardian_phone = guardian_phone.clone();
    }
    if let Some(email) = &patch.email {
        merged.email = email.clone();
    }
    if let Some(sex) = &patch.sex {
        merged.sex = sex.clone();
    }
    if let Some(health_card_number) = &patch.health_card_number {
        merged.health_card_number = health_card_number.clone();
    }
    if patch.is_smoker.is_some() {
        merged.is_smoker = patch.is_smoker;
    }
    if patch.is_drinker.is_some() {
        merged.is_drinker = patch.is_drinker;
    }
    if patch.has_suspicious_lesion.is_some() {
        merged.has_suspicious_lesion = patch.has_suspicious_lesion;
    }
    if patch.participates_in_smart_monitor.is_some() {
        merged.participates_in_smart_monitor = patch.participates_in_smart_monitor;
    }

    merged
}

/// Overwrite the four clinical flags.
pub fn apply_flags_patch(existing: Patient, flags: &FlagsPatch) -> Patient {
    let mut merged = existing;
    if flags.is_smoker.is_some() {
        merged.is_smoker = flags.is_smoker;
    }
    if flags.is_drinker.is_some() {
        merged.is_drinker = flags.is_drinker;
    }
    if flags.has_suspicious_lesion.is_some() {
        merged.has_suspicious_lesion = flags.has_suspicious_lesion;
    }
    if flags.participates_in_smart_monitor.is_some() {
        merged.participates_in_smart_monitor = flags.participates_in_smart_monitor;
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stored_patient() -> Patient {
        Patient {
            id: Some(7),
            identity_number: "12345678901".to_string(),
            full_name: "João da Silva".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 30).unwrap(),
            mother_name: "Maria da Silva".to_string(),
            postal_code: "74000000".to_string(),
            street: "Rua 10".to_string(),
            street_number: "100".to_string(),
            complement: "Apto 201".to_string(),
            neighborhood: "Setor Central".to_string(),
            city: "Goiânia".to_string(),
            state: "GO".to_string(),
            mobile_phone: "62999998888".to_string(),
            guardian_phone: "62988887777".to_string(),
            email: "joao.silva@email.com".to_string(),
            sex: "Masculino".to_string(),
            health_card_number: "700001234567890".to_string(),
            is_smoker: Some(false),
            is_drinker: Some(false),
            has_suspicious_lesion: None,
            participates_in_smart_monitor: Some(true),
        }
    }

    #[test]
    fn full_replace_keeps_stored_id() {
        let existing = stored_patient();
        let incoming = Patient {
            id: None,
            identity_number: "98765432100".to_string(),
            full_name: "Ana Souza".to_string(),
            complement: String::new(),
            ..stored_patient()
        };

        let replaced = apply_full_replace(&existing, incoming.clone());

        assert_eq!(replaced.id, Some(7));
        assert_eq!(replaced.identity_number, "98765432100");
        assert_eq!(replaced.full_name, "Ana Souza");
        assert_eq!(replaced.complement, "");
        assert_eq!(Patient { id: None, ..replaced }, incoming);
    }

    #[test]
    fn single_flag_patch_changes_only_that_flag() {
        let existing = stored_patient();
        let patch = PatientPatch {
            is_smoker: Some(true),
            ..Default::default()
        };

        let patched = apply_partial_patch(existing.clone(), &patch);

        assert_eq!(patched.is_smoker, Some(true));
        assert_eq!(
            Patient {
                is_smoker: existing.is_smoker,
                ..patched
            },
            existing
        );
    }

    #[test]
    fn empty_complement_clears_the_field() {
        let patch = PatientPatch {
            complement: Some(String::new()),
            ..Default::default()
        };

        let patched = apply_partial_patch(stored_patient(), &patch);
        assert_eq!(patched.complement, "");
    }

    #[test]
    fn absent_fields_are_left_untouched() {
        let existing = stored_patient();
        let patched = apply_partial_patch(existing.clone(), &PatientPatch::default());
        assert_eq!(patched, existing);
    }

    #[test]
    fn patch_does_not_consume_the_payload() {
        let patch = PatientPatch {
            city: Some("Anápolis".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1985, 5, 1),
            ..Default::default()
        };

        let patched = apply_partial_patch(stored_patient(), &patch);

        assert_eq!(patched.city, "Anápolis");
        assert_eq!(patched.birth_date, NaiveDate::from_ymd_opt(1985, 5, 1).unwrap());
        assert_eq!(patch.city.as_deref(), Some("Anápolis"));
    }

    #[test]
    fn flags_patch_overwrites_all_four_flags() {
        let flags = FlagsPatch {
            is_smoker: Some(true),
            is_drinker: Some(true),
            has_suspicious_lesion: Some(false),
            participates_in_smart_monitor: Some(false),
        };

        let patched = apply_flags_patch(stored_patient(), &flags);

        assert_eq!(patched.is_smoker, Some(true));
        assert_eq!(patched.is_drinker, Some(true));
        assert_eq!(patched.has_suspicious_lesion, Some(false));
        assert_eq!(patched.participates_in_smart_monitor, Some(false));
        assert_eq!(patched.full_name, "João da Silva");
    }
}
