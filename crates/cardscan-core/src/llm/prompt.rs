//! The fixed instruction and output contract sent with every card.

use serde_json::{json, Map, Value};

use crate::types::CONTACT_FIELDS;

/// System instruction defining the seven output fields.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert business card data extractor. Extract structured data from business cards.

FIELD DEFINITIONS:
- fullName: The PRIMARY person's name on the card (the main contact person, NOT the company name)
- jobTitle: The person's designation/role (e.g., \"Founder & CEO\", \"Managing Director\", \"Sales Agent\")
- companyName: The COMPANY or BUSINESS name (not the person's name)
- primaryEmail: The main email address
- contactPhone: ALL phone numbers, separated by comma
- websiteURL: Website address if present
- physicalAddress: Full office/business address

IMPORTANT RULES:
1. Distinguish between PERSON NAME and COMPANY NAME carefully
2. Company names often have \"Ltd\", \"Pvt\", \"Industries\", \"Traders\", \"Corp\", \"LLC\" etc.
3. Combine ALL phone numbers into one field, separated by commas
4. If a field is not present, use empty string \"\"
5. Output ONLY valid JSON, no extra text";

/// User turn accompanying the image.
pub const USER_PROMPT: &str = "Extract data from this business card.";

/// JSON Schema for the model output: one object, all seven fields required.
pub fn contact_schema() -> Value {
    let mut properties = Map::new();
    for field in CONTACT_FIELDS {
        properties.insert(field.to_string(), json!({ "type": "string" }));
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": CONTACT_FIELDS,
        "additionalProperties": false,
    })
}
