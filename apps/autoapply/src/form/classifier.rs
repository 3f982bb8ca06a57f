//! Field classification: an ordered chain of detectors over a [`FieldView`].
//!
//! Detectors are not mutually exclusive. A container can yield several
//! descriptors, e.g. a consent checkbox sitting under a free-text question.

use std::collections::VecDeque;

use crate::answers::placeholder::is_placeholder_option;
use crate::driver::ElementRef;
use crate::form::view::{DomNode, FieldView, InputView};
use crate::models::QuestionType;

/// Depth bound for the breadth-first label search.
pub const LABEL_SEARCH_DEPTH: usize = 12;
const STRUCTURAL_KEY_CHARS: usize = 120;

const NUMERIC_MARKER: &str = "numeric";
const DATE_PICKER_CLASS: &str = "artdeco-datepicker__input";

const CONSENT_KEYWORDS: &[&str] = &[
    "terms of service",
    "privacy policy",
    "terms of use",
    "politique de confidentialité",
    "conditions d’utilisation",
    "conditions d'utilisation",
    "j'accepte",
    "j’accepte",
    "confidentialité",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Upload,
    Consent,
    MultilineText,
    SingleChoice,
    Dropdown,
    Text,
    Numeric,
    Typeahead,
    DatePicker,
}

impl ControlKind {
    /// The answer-store type, for kinds answered through the resolver.
    pub fn question_type(self) -> Option<QuestionType> {
        match self {
            ControlKind::Text | ControlKind::MultilineText | ControlKind::Typeahead => {
                Some(QuestionType::Text)
            }
            ControlKind::Numeric => Some(QuestionType::Numeric),
            ControlKind::Dropdown => Some(QuestionType::Dropdown),
            ControlKind::SingleChoice => Some(QuestionType::Radio),
            ControlKind::Upload | ControlKind::Consent | ControlKind::DatePicker => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub text: String,
    pub element: ElementRef,
}

/// Re-derived on every scan pass; never cached across passes.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub stable_key: String,
    pub kind: ControlKind,
    pub question: String,
    pub options: Option<Vec<String>>,
    pub current_value: String,
    pub already_answered: bool,
    /// Element the answer is applied to (input, select, textarea or clickable label).
    pub control: ElementRef,
    pub control_id: String,
    /// Clickable labels of a choice group.
    pub choices: Vec<Choice>,
}

impl FieldDescriptor {
    fn new(key: &str, kind: ControlKind, question: String, control: ElementRef) -> Self {
        Self {
            stable_key: key.to_string(),
            kind,
            question,
            options: None,
            current_value: String::new(),
            already_answered: false,
            control,
            control_id: String::new(),
            choices: Vec::new(),
        }
    }
}

type Detector = fn(&FieldView, &str) -> Option<FieldDescriptor>;

const DETECTORS: &[Detector] = &[
    detect_upload,
    detect_consent,
    detect_multiline,
    detect_single_choice,
    detect_dropdown,
    detect_text,
    detect_date_picker,
];

/// Runs every detector in order. An empty result means nothing recognizable,
/// which callers do not treat as an error.
pub fn classify(view: &FieldView) -> Vec<FieldDescriptor> {
    let key = stable_key(view);
    DETECTORS
        .iter()
        .filter_map(|detect| detect(view, &key))
        .collect()
}

/// Identity of a container that survives re-renders within one step:
/// the first label's `for` target, else its text, else a structural prefix.
pub fn stable_key(view: &FieldView) -> String {
    if let Some(label) = view.labels.first() {
        if let Some(target) = label.for_id.as_deref().filter(|t| !t.trim().is_empty()) {
            return target.to_string();
        }
        if !label.text.trim().is_empty() {
            return label.text.trim().to_string();
        }
    }
    view.outer_html.chars().take(STRUCTURAL_KEY_CHARS).collect()
}

/// First non-empty `label` text reached breadth-first, at most `max_depth` levels down.
pub fn deep_label_text(root: &DomNode, max_depth: usize) -> String {
    let mut queue: VecDeque<(&DomNode, usize)> = VecDeque::from([(root, 0)]);
    while let Some((node, depth)) = queue.pop_front() {
        if depth > max_depth {
            break;
        }
        if node.tag.eq_ignore_ascii_case("label") && !node.text.trim().is_empty() {
            return node.text.trim().to_string();
        }
        queue.extend(node.children.iter().map(|child| (child, depth + 1)));
    }
    String::new()
}

fn first_label_text(view: &FieldView) -> String {
    view.labels
        .iter()
        .map(|l| l.text.trim())
        .find(|t| !t.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn question_text(view: &FieldView) -> String {
    view.tree
        .as_ref()
        .map(|tree| deep_label_text(tree, LABEL_SEARCH_DEPTH))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| first_label_text(view))
}

fn detect_upload(view: &FieldView, key: &str) -> Option<FieldDescriptor> {
    let input = view.inputs.iter().find(|i| i.is_type("file"))?;
    let question = Some(first_label_text(view))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| input.id.clone());
    let mut desc = FieldDescriptor::new(key, ControlKind::Upload, question, input.element.clone());
    desc.control_id = input.id.clone();
    desc.current_value = input.value.clone();
    desc.already_answered = !input.value.trim().is_empty();
    Some(desc)
}

fn detect_consent(view: &FieldView, key: &str) -> Option<FieldDescriptor> {
    let checkboxes: Vec<&InputView> = view.inputs.iter().filter(|i| i.is_type("checkbox")).collect();
    if checkboxes.is_empty() {
        return None;
    }
    let label = view.labels.iter().find(|l| {
        let text = l.text.to_lowercase();
        CONSENT_KEYWORDS.iter().any(|kw| text.contains(kw))
    })?;
    let checkbox = label
        .for_id
        .as_deref()
        .and_then(|target| checkboxes.iter().find(|c| c.id == target))
        .unwrap_or(&checkboxes[0]);

    let mut desc = FieldDescriptor::new(
        key,
        ControlKind::Consent,
        label.text.trim().to_string(),
        label.element.clone(),
    );
    desc.control_id = checkbox.id.clone();
    desc.already_answered = checkbox.checked;
    Some(desc)
}

fn detect_multiline(view: &FieldView, key: &str) -> Option<FieldDescriptor> {
    if !view.multiline {
        return None;
    }
    let textarea = view
        .textareas
        .iter()
        .find(|t| t.displayed)
        .or_else(|| view.textareas.first())?;
    let mut desc = FieldDescriptor::new(
        key,
        ControlKind::MultilineText,
        first_label_text(view),
        textarea.element.clone(),
    );
    desc.control_id = textarea.id.clone();
    desc.current_value = textarea.value.clone();
    desc.already_answered = !textarea.value.trim().is_empty();
    Some(desc)
}

fn detect_single_choice(view: &FieldView, key: &str) -> Option<FieldDescriptor> {
    let radios: Vec<&InputView> = view.inputs.iter().filter(|i| i.is_type("radio")).collect();
    if radios.is_empty() {
        return None;
    }
    let question = view
        .legend
        .as_deref()
        .or(view.title.as_deref())
        .map(|q| q.trim().to_string())
        .unwrap_or_default();

    let is_radio_label = |for_id: &Option<String>| {
        for_id
            .as_deref()
            .map_or(false, |target| radios.iter().any(|r| r.id == target))
    };
    let associated = view.labels.iter().any(|l| is_radio_label(&l.for_id));
    let choices: Vec<_> = view
        .labels
        .iter()
        .filter(|l| !l.text.trim().is_empty())
        .filter(|l| !associated || is_radio_label(&l.for_id))
        .map(|l| Choice {
            text: l.text.trim().to_string(),
            element: l.element.clone(),
        })
        .collect();
    let first = choices.first()?.element.clone();

    let mut desc = FieldDescriptor::new(key, ControlKind::SingleChoice, question, first);
    desc.options = Some(choices.iter().map(|c| c.text.clone()).collect());
    desc.already_answered = radios.iter().any(|r| r.checked);
    desc.current_value = radios
        .iter()
        .find(|r| r.checked)
        .map(|r| r.value.clone())
        .unwrap_or_default();
    desc.choices = choices;
    Some(desc)
}

fn detect_dropdown(view: &FieldView, key: &str) -> Option<FieldDescriptor> {
    let select = view.selects.first()?;
    let question = Some(first_label_text(view))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| question_text(view));
    let mut desc =
        FieldDescriptor::new(key, ControlKind::Dropdown, question, select.element.clone());
    desc.control_id = select.id.clone();
    desc.options = Some(select.options.iter().map(|o| o.trim().to_string()).collect());
    desc.current_value = select.selected.trim().to_string();
    desc.already_answered = !is_placeholder_option(&select.selected) && !select.enabled;
    Some(desc)
}

fn is_text_input(input: &InputView) -> bool {
    input.displayed
        && !["hidden", "file", "checkbox", "radio"]
            .iter()
            .any(|t| input.is_type(t))
        && !input.has_class(DATE_PICKER_CLASS)
}

fn detect_text(view: &FieldView, key: &str) -> Option<FieldDescriptor> {
    let field = view.inputs.iter().find(|i| is_text_input(i)).or_else(|| {
        if view.multiline {
            None
        } else {
            view.textareas.iter().find(|t| t.displayed)
        }
    })?;

    let is_typeahead = field
        .role
        .as_deref()
        .map_or(false, |r| r.eq_ignore_ascii_case("combobox"))
        && field
            .aria_autocomplete
            .as_deref()
            .map_or(false, |a| a.eq_ignore_ascii_case("list"));
    let kind = if is_typeahead {
        ControlKind::Typeahead
    } else if field.id.to_lowercase().contains(NUMERIC_MARKER) {
        ControlKind::Numeric
    } else {
        ControlKind::Text
    };

    let mut desc = FieldDescriptor::new(key, kind, question_text(view), field.element.clone());
    desc.control_id = field.id.clone();
    desc.current_value = field.value.clone();
    desc.already_answered = !field.value.trim().is_empty();
    Some(desc)
}

fn detect_date_picker(view: &FieldView, key: &str) -> Option<FieldDescriptor> {
    let input = view
        .inputs
        .iter()
        .find(|i| i.has_class(DATE_PICKER_CLASS))?;
    let mut desc = FieldDescriptor::new(
        key,
        ControlKind::DatePicker,
        first_label_text(view),
        input.element.clone(),
    );
    desc.control_id = input.id.clone();
    desc.current_value = input.value.clone();
    desc.already_answered = !input.value.trim().is_empty();
    Some(desc)
}
