//! HTML rendering for the form and result pages

use std::fmt::Write;

use serde::Deserialize;

use sarcon_core::{
    InputError, LadderStage, LocationLevels, ObservationInput, Radiotherapy, RiskReport,
};

pub const TITLE: &str = "soft tissue Sarcoma Reconstruction Nomogram (SaRcoN)";

pub const INFO: &str = "This is a tool to predict reconstructive outcomes in limb-sparing \
                        extremity soft tissue sarcoma surgery";

/// Form fields exactly as submitted
///
/// Kept as text so a rejected submission re-renders with what was typed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormValues {
    pub location: String,
    pub ladder: String,
    pub bmi: String,
    pub tumor_length: String,
    pub tumor_width: String,
    pub tumor_thickness: String,
    pub radiotherapy: String,
    pub limb_segment_length: String,
    pub limb_segment_thickness: String,
}

impl FormValues {
    /// Values the form starts with before anything is submitted
    pub fn initial(locations: LocationLevels) -> Self {
        let zero = || "0".to_string();
        Self {
            location: locations.levels().first().copied().unwrap_or_default().to_string(),
            ladder: LadderStage::PrimaryClosure.option_name().to_string(),
            bmi: "10".to_string(),
            tumor_length: zero(),
            tumor_width: zero(),
            tumor_thickness: zero(),
            radiotherapy: Radiotherapy::No.option_name().to_string(),
            limb_segment_length: zero(),
            limb_segment_thickness: zero(),
        }
    }

    /// Parse the numeric fields. An empty radiotherapy field means `no`.
    pub fn to_input(&self) -> Result<ObservationInput, InputError> {
        let radiotherapy = if self.radiotherapy.trim().is_empty() {
            Radiotherapy::No.option_name().to_string()
        } else {
            self.radiotherapy.clone()
        };
        Ok(ObservationInput {
            location: self.location.clone(),
            ladder: self.ladder.clone(),
            bmi: parse_number("bmi", &self.bmi)?,
            tumor_length: parse_number("tumor_length", &self.tumor_length)?,
            tumor_width: parse_number("tumor_width", &self.tumor_width)?,
            tumor_thickness: parse_number("tumor_thickness", &self.tumor_thickness)?,
            radiotherapy,
            limb_segment_length: parse_number("limb_segment_length", &self.limb_segment_length)?,
            limb_segment_thickness: parse_number(
                "limb_segment_thickness",
                &self.limb_segment_thickness,
            )?,
        })
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, InputError> {
    value.trim().parse().map_err(|_| InputError::NotANumber {
        field,
        value: value.to_string(),
    })
}

/// Form on its own
pub fn form_page(values: &FormValues, locations: LocationLevels) -> String {
    layout(&form(values, locations))
}

/// Form followed by the predicted probabilities
pub fn result_page(values: &FormValues, locations: LocationLevels, report: &RiskReport) -> String {
    let mut body = form(values, locations);
    body.push_str("<section class=\"results\">\n<h2>Predicted Probabilities</h2>\n");

    for (outcome, result) in &report.results {
        match result {
            Ok(prediction) => {
                let _ = writeln!(
                    body,
                    "<div class=\"outcome\"><p>{}</p><progress max=\"100\" value=\"{}\"></progress></div>",
                    escape(&prediction.summary()),
                    prediction.progress()
                );
            }
            Err(e) => {
                let _ = writeln!(
                    body,
                    "<div class=\"outcome error\"><p>{} Risk: unavailable ({})</p></div>",
                    outcome.label(),
                    escape(&e.to_string())
                );
            }
        }
    }

    body.push_str("</section>\n");
    layout(&body)
}

/// Form with a validation message above it
pub fn error_page(values: &FormValues, locations: LocationLevels, message: &str) -> String {
    let mut body = format!(
        "<div class=\"invalid\" role=\"alert\">{}</div>\n",
        escape(message)
    );
    body.push_str(&form(values, locations));
    layout(&body)
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>SaRcoN</title>\n</head>\n<body>\n<h1>{}</h1>\n\
         <div class=\"info\">{}</div>\n{}</body>\n</html>\n",
        TITLE, INFO, body
    )
}

fn form(input: &FormValues, locations: LocationLevels) -> String {
    let mut html = String::from("<form method=\"post\" action=\"/predict\">\n");

    select(
        &mut html,
        "location",
        "STS Location",
        locations.levels().into_iter(),
        &input.location,
    );
    select(
        &mut html,
        "ladder",
        "Reconstructive Ladder",
        LadderStage::ALL.iter().map(|l| l.option_name()),
        &input.ladder,
    );
    number(
        &mut html,
        "bmi",
        "Body Mass Index",
        &input.bmi,
        " min=\"10\" max=\"50\" step=\"0.1\"",
    );
    number(
        &mut html,
        "tumor_length",
        "Tumor Length (craniocaudal), cm",
        &input.tumor_length,
        LENGTH_ATTRS,
    );
    number(
        &mut html,
        "tumor_width",
        "Tumor Width (mediolateral), cm",
        &input.tumor_width,
        LENGTH_ATTRS,
    );
    number(
        &mut html,
        "tumor_thickness",
        "Tumor Thickness (anteroposterior), cm",
        &input.tumor_thickness,
        LENGTH_ATTRS,
    );
    select(
        &mut html,
        "radiotherapy",
        "Neoadjuvant Radiotherapy",
        Radiotherapy::ALL.iter().map(|r| r.option_name()),
        &input.radiotherapy,
    );
    number(
        &mut html,
        "limb_segment_length",
        "Limb Segment Length (craniocaudal), cm",
        &input.limb_segment_length,
        LENGTH_ATTRS,
    );
    number(
        &mut html,
        "limb_segment_thickness",
        "Limb Segment Thickness (anteroposterior), cm",
        &input.limb_segment_thickness,
        LENGTH_ATTRS,
    );

    html.push_str("<button type=\"submit\">Predict</button>\n</form>\n");
    html
}

const LENGTH_ATTRS: &str = " min=\"0\" step=\"any\"";

fn select<'a>(
    html: &mut String,
    name: &str,
    label: &str,
    options: impl Iterator<Item = &'a str>,
    selected: &str,
) {
    let _ = writeln!(html, "<label for=\"{name}\">{label}</label>");
    let _ = writeln!(html, "<select id=\"{name}\" name=\"{name}\">");
    for option in options {
        let marker = if option == selected { " selected" } else { "" };
        let _ = writeln!(html, "<option value=\"{option}\"{marker}>{option}</option>");
    }
    html.push_str("</select>\n");
}

fn number(html: &mut String, name: &str, label: &str, value: &str, attrs: &str) {
    let value = escape(value);
    let _ = writeln!(html, "<label for=\"{name}\">{label}</label>");
    let _ = writeln!(
        html,
        "<input type=\"number\" id=\"{name}\" name=\"{name}\" value=\"{value}\"{attrs} required>"
    );
}

/// Escape text for use inside HTML elements and attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
