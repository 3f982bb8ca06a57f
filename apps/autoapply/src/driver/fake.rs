//! Scripted in-memory [`PageDriver`] for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{DriverError, ElementRef, Locator, PageDriver};

#[derive(Default)]
struct FakeState {
    url: String,
    url_script: VecDeque<String>,
    elements: HashMap<String, Vec<ElementRef>>,
    texts: HashMap<String, String>,
    attributes: HashMap<(String, String), String>,
    hidden: HashSet<String>,
    disabled: HashSet<String>,
    selected: HashSet<String>,
    stale: HashSet<String>,
    stale_after_click: HashSet<String>,
    reveal_on_keys: HashMap<String, (String, ElementRef)>,
    script_results: Vec<(String, Value)>,
    actions: Vec<String>,
}

/// Elements are registered under their locator value (`"li.tile"`, `"//button"`),
/// optionally prefixed with `"<scope id>>"` for scoped lookups.
#[derive(Default)]
pub struct FakeDriver {
    state: Mutex<FakeState>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, selector: &str, id: &str) -> ElementRef {
        let el = ElementRef::new(id);
        self.state
            .lock()
            .unwrap()
            .elements
            .entry(selector.to_string())
            .or_default()
            .push(el.clone());
        el
    }

    pub fn add_scoped(&self, scope: &ElementRef, selector: &str, id: &str) -> ElementRef {
        self.add(&format!("{}>{}", scope.id, selector), id)
    }

    pub fn set_text(&self, id: &str, text: &str) {
        self.state
            .lock()
            .unwrap()
            .texts
            .insert(id.to_string(), text.to_string());
    }

    pub fn set_attribute(&self, id: &str, name: &str, value: &str) {
        self.state
            .lock()
            .unwrap()
            .attributes
            .insert((id.to_string(), name.to_string()), value.to_string());
    }

    pub fn hide(&self, id: &str) {
        self.state.lock().unwrap().hidden.insert(id.to_string());
    }

    pub fn disable(&self, id: &str) {
        self.state.lock().unwrap().disabled.insert(id.to_string());
    }

    pub fn select(&self, id: &str) {
        self.state.lock().unwrap().selected.insert(id.to_string());
    }

    pub fn stale_after_click(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .stale_after_click
            .insert(id.to_string());
    }

    /// Registers `selector -> id` only once keys have been sent to `trigger`.
    pub fn reveal_on_keys(&self, trigger: &str, selector: &str, id: &str) {
        self.state.lock().unwrap().reveal_on_keys.insert(
            trigger.to_string(),
            (selector.to_string(), ElementRef::new(id)),
        );
    }

    pub fn set_url(&self, url: &str) {
        self.state.lock().unwrap().url = url.to_string();
    }

    /// Successive `current_url` calls return these URLs in order, then stick on the last.
    pub fn script_urls(&self, urls: &[&str]) {
        self.state
            .lock()
            .unwrap()
            .url_script
            .extend(urls.iter().map(|u| u.to_string()));
    }

    /// Any script containing `needle` returns `result`.
    pub fn on_script(&self, needle: &str, result: Value) {
        self.state
            .lock()
            .unwrap()
            .script_results
            .push((needle.to_string(), result));
    }

    pub fn actions(&self) -> Vec<String> {
        self.state.lock().unwrap().actions.clone()
    }

    fn check_live(state: &FakeState, el: &ElementRef) -> Result<(), DriverError> {
        if state.stale.contains(&el.id) {
            Err(DriverError::StaleElement)
        } else {
            Ok(())
        }
    }

    fn lookup(state: &FakeState, scope: Option<&ElementRef>, locator: &Locator) -> Vec<ElementRef> {
        let value = locator.to_w3c().1;
        let key = match (scope, locator) {
            (Some(s), _) => format!("{}>{}", s.id, value),
            (None, Locator::Id(id)) if !state.elements.contains_key(&value) => id.clone(),
            (None, Locator::Class(c)) if !state.elements.contains_key(&value) => c.clone(),
            _ => value,
        };
        state
            .elements
            .get(&key)
            .map(|els| {
                els.iter()
                    .filter(|e| !state.stale.contains(&e.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        state.actions.push(format!("navigate:{url}"));
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let mut state = self.state.lock().unwrap();
        if let Some(next) = state.url_script.pop_front() {
            state.url = next;
        }
        Ok(state.url.clone())
    }

    async fn find(
        &self,
        scope: Option<&ElementRef>,
        locator: &Locator,
    ) -> Result<ElementRef, DriverError> {
        let state = self.state.lock().unwrap();
        Self::lookup(&state, scope, locator)
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement(locator.to_string()))
    }

    async fn find_all(
        &self,
        scope: Option<&ElementRef>,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>, DriverError> {
        let state = self.state.lock().unwrap();
        Ok(Self::lookup(&state, scope, locator))
    }

    async fn click(&self, element: &ElementRef) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::check_live(&state, element)?;
        state.actions.push(format!("click:{}", element.id));
        if state.stale_after_click.contains(&element.id) {
            state.stale.insert(element.id.clone());
        }
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::check_live(&state, element)?;
        state.actions.push(format!("clear:{}", element.id));
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::check_live(&state, element)?;
        state.actions.push(format!("keys:{}:{}", element.id, text));
        if let Some((selector, revealed)) = state.reveal_on_keys.remove(&element.id) {
            state.elements.entry(selector).or_default().push(revealed);
        }
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> Result<String, DriverError> {
        let state = self.state.lock().unwrap();
        Self::check_live(&state, element)?;
        Ok(state.texts.get(&element.id).cloned().unwrap_or_default())
    }

    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let state = self.state.lock().unwrap();
        Self::check_live(&state, element)?;
        Ok(state
            .attributes
            .get(&(element.id.clone(), name.to_string()))
            .cloned())
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool, DriverError> {
        let state = self.state.lock().unwrap();
        Self::check_live(&state, element)?;
        Ok(!state.hidden.contains(&element.id))
    }

    async fn is_enabled(&self, element: &ElementRef) -> Result<bool, DriverError> {
        let state = self.state.lock().unwrap();
        Self::check_live(&state, element)?;
        Ok(!state.disabled.contains(&element.id))
    }

    async fn is_selected(&self, element: &ElementRef) -> Result<bool, DriverError> {
        let state = self.state.lock().unwrap();
        Self::check_live(&state, element)?;
        Ok(state.selected.contains(&element.id))
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        let mut state = self.state.lock().unwrap();
        let target = args
            .first()
            .and_then(|a| serde_json::from_value::<ElementRef>(a.clone()).ok());
        let head: String = script.chars().take(40).collect();
        match &target {
            Some(el) => state.actions.push(format!("script:{}:{}", el.id, head)),
            None => state.actions.push(format!("script:{head}")),
        }
        if let Some(el) = &target {
            if script.contains(".click()") && state.stale_after_click.contains(&el.id) {
                state.stale.insert(el.id.clone());
            }
        }
        Ok(state
            .script_results
            .iter()
            .find(|(needle, _)| script.contains(needle.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Null))
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.state.lock().unwrap().actions.push("quit".to_string());
        Ok(())
    }
}
