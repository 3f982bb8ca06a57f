//! Snapshot of one field container, produced in a single script round-trip by the
//! live session and consumed by the pure classifier.

use serde::Deserialize;

use crate::driver::ElementRef;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub container: ElementRef,
    /// Bare upload card found outside the standard field containers.
    #[serde(default)]
    pub upload_block: bool,
    #[serde(default)]
    pub outer_html: String,
    /// Every `label` under the container, in document order.
    #[serde(default)]
    pub labels: Vec<LabelView>,
    #[serde(default)]
    pub legend: Option<String>,
    /// Title block used by choice groups without a legend.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub multiline: bool,
    #[serde(default)]
    pub inputs: Vec<InputView>,
    #[serde(default)]
    pub textareas: Vec<InputView>,
    #[serde(default)]
    pub selects: Vec<SelectView>,
    /// Label-bearing skeleton of the container, bounded in depth by the scan script.
    #[serde(default)]
    pub tree: Option<DomNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelView {
    pub element: ElementRef,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub for_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputView {
    pub element: ElementRef,
    #[serde(default)]
    pub input_type: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub aria_autocomplete: Option<String>,
    #[serde(default = "default_true")]
    pub displayed: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub checked: bool,
}

impl InputView {
    pub fn is_type(&self, t: &str) -> bool {
        self.input_type.eq_ignore_ascii_case(t)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_name.split_whitespace().any(|c| c == class)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectView {
    pub element: ElementRef,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub selected: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DomNode {
    pub tag: String,
    /// Text of `label` nodes only; empty elsewhere.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<DomNode>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
pub(crate) mod build {
    //! Terse constructors for tests that script a form by hand.

    use super::*;

    pub fn container(id: &str) -> FieldView {
        FieldView {
            container: ElementRef::new(id),
            upload_block: false,
            outer_html: format!("<div data-test-form-element id=\"{id}\">"),
            labels: Vec::new(),
            legend: None,
            title: None,
            multiline: false,
            inputs: Vec::new(),
            textareas: Vec::new(),
            selects: Vec::new(),
            tree: None,
        }
    }

    pub fn label(el: &str, text: &str, for_id: Option<&str>) -> LabelView {
        LabelView {
            element: ElementRef::new(el),
            text: text.to_string(),
            for_id: for_id.map(str::to_string),
        }
    }

    pub fn input(el: &str, input_type: &str, id: &str, value: &str) -> InputView {
        InputView {
            element: ElementRef::new(el),
            input_type: input_type.to_string(),
            id: id.to_string(),
            value: value.to_string(),
            class_name: String::new(),
            role: None,
            aria_autocomplete: None,
            displayed: true,
            enabled: true,
            checked: false,
        }
    }

    /// Single-line input with its label, as most text questions render.
    pub fn text_field(key: &str, question: &str, value: &str) -> FieldView {
        let mut view = container(&format!("{key}-box"));
        view.labels.push(label(&format!("{key}-label"), question, Some(key)));
        view.inputs
            .push(input(&format!("{key}-input"), "text", key, value));
        view
    }

    pub fn select_field(key: &str, question: &str, options: &[&str], selected: &str) -> FieldView {
        let mut view = container(&format!("{key}-box"));
        view.labels.push(label(&format!("{key}-label"), question, Some(key)));
        view.selects.push(SelectView {
            element: ElementRef::new(format!("{key}-select")),
            id: key.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            selected: selected.to_string(),
            enabled: true,
        });
        view
    }

    pub fn radio_field(key: &str, question: &str, choices: &[&str], checked: Option<&str>) -> FieldView {
        let mut view = container(&format!("{key}-box"));
        view.legend = Some(question.to_string());
        for (i, choice) in choices.iter().enumerate() {
            let radio_id = format!("{key}-{i}");
            let mut radio = input(&format!("{radio_id}-input"), "radio", &radio_id, choice);
            radio.checked = checked == Some(*choice);
            view.inputs.push(radio);
            view.labels
                .push(label(&format!("{radio_id}-label"), choice, Some(&radio_id)));
        }
        view
    }
}
