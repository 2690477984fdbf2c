//! Healthcare recognizers: provider and prescription registries, insurance
//! and record identifiers, diagnosis codes, and a medication deny-list.

use super::{PatternDef, RecognizerDef};
use crate::constants::DENY_LIST_SCORE;

const COMMON_MEDICATIONS: &[&str] = &[
    "aspirin",
    "ibuprofen",
    "acetaminophen",
    "metformin",
    "lisinopril",
    "atorvastatin",
    "amoxicillin",
    "omeprazole",
    "amlodipine",
    "metoprolol",
    "gabapentin",
    "sertraline",
    "insulin",
    "warfarin",
    "prednisone",
    "levothyroxine",
    "fluoxetine",
    "alprazolam",
    "hydrochlorothiazide",
    "losartan",
    "simvastatin",
    "citalopram",
    "tramadol",
    "oxycodone",
];

pub(super) fn defs() -> Vec<RecognizerDef> {
    vec![
        RecognizerDef::new(
            "NPI_NUMBER",
            vec![PatternDef::new("npi_10_digit", r"\b\d{10}\b", 0.3)],
        )
        .with_context(&["npi", "provider", "practitioner"]),
        RecognizerDef::new(
            "DEA_NUMBER",
            vec![PatternDef::new("dea", r"\b[A-Z]{2}\d{7}\b", 0.6)],
        )
        .with_context(&["dea", "prescriber", "prescription"]),
        RecognizerDef::new(
            "INSURANCE_ID",
            vec![
                PatternDef::new(
                    "prefixed_policy",
                    r"\b(?:POL|PLC|GRP|MBR|INS|CLM)[- ]?\d{6,12}\b",
                    0.7,
                ),
                PatternDef::new("generic_policy", r"\b[A-Z]{1,3}\d{6,12}\b", 0.4),
            ],
        )
        .with_context(&["insurance", "policy", "member", "claim", "group", "beneficiary"]),
        RecognizerDef::new(
            "ICD10_CODE",
            vec![PatternDef::new(
                "icd10",
                r"\b[A-TV-Z]\d{2}(?:\.\d{1,4})?\b",
                0.6,
            )],
        )
        .with_context(&["icd", "diagnosis", "diagnosed", "condition", "code"]),
        RecognizerDef::new(
            "MEDICAL_RECORD_NUMBER",
            vec![
                PatternDef::new("mrn_dashed", r"\b\d{3}-\d{3}-\d{3}\b", 0.4),
                PatternDef::new("mrn_plain", r"\b\d{7,10}\b", 0.2),
            ],
        )
        .with_context(&["mrn", "medical record", "chart", "patient"]),
        RecognizerDef::new("DRUG_NAME", Vec::new())
            .with_deny_list(COMMON_MEDICATIONS, DENY_LIST_SCORE)
            .with_context(&["prescribed", "medication", "dose", "mg", "daily"]),
    ]
}
