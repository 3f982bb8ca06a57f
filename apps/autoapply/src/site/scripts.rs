//! Scripts executed in the page. Each returns plain JSON (or element references)
//! so a whole step can be read in one round-trip.

/// `(root, labelDepth, containerSelector, uploadBlockSelector)` -> `FieldView[]`.
///
/// Bare upload cards outside a standard container are reported with
/// `uploadBlock: true`.
pub const SCAN_FIELDS: &str = r#"
const [root, depth, containerSel, uploadSel] = arguments;
const scope = root || document;
const visible = (el) => !!(el.offsetParent || el.getClientRects().length);
const skeleton = (node, level) => {
  if (level > depth) return null;
  const out = {
    tag: node.tagName.toLowerCase(),
    text: node.tagName === 'LABEL' ? node.innerText.trim() : '',
    children: [],
  };
  for (const child of node.children) {
    const sub = skeleton(child, level + 1);
    if (sub) out.children.push(sub);
  }
  return out;
};
const control = (el) => ({
  element: el,
  inputType: (el.getAttribute('type') || el.tagName).toLowerCase(),
  id: el.id || '',
  value: el.value || '',
  className: typeof el.className === 'string' ? el.className : '',
  role: el.getAttribute('role'),
  ariaAutocomplete: el.getAttribute('aria-autocomplete'),
  displayed: visible(el),
  enabled: !el.disabled,
  checked: !!el.checked,
});
const describe = (container, uploadBlock) => {
  const legend = container.querySelector('legend');
  const title = container.querySelector(
    '[data-test-text-entity-list-form-title], .fb-dash-form-element__label-title--is-required');
  return {
    container,
    uploadBlock,
    outerHtml: container.outerHTML.slice(0, 500),
    labels: Array.from(container.querySelectorAll('label')).map((l) => ({
      element: l, text: l.innerText.trim(), forId: l.getAttribute('for'),
    })),
    legend: legend ? legend.innerText.trim() : null,
    title: title ? title.innerText.trim() : null,
    multiline: !!container.querySelector('[data-test-multiline-text-form-component]'),
    inputs: Array.from(container.querySelectorAll('input')).map(control),
    textareas: Array.from(container.querySelectorAll('textarea')).map(control),
    selects: Array.from(container.querySelectorAll('select')).map((s) => ({
      element: s,
      id: s.id || '',
      options: Array.from(s.options).map((o) => o.text.trim()),
      selected: s.selectedIndex >= 0 ? s.options[s.selectedIndex].text.trim() : '',
      enabled: !s.disabled,
    })),
    tree: skeleton(container, 0),
  };
};
const containers = Array.from(scope.querySelectorAll(containerSel));
const views = containers.map((c) => describe(c, false));
for (const input of scope.querySelectorAll("input[type='file']")) {
  const block = input.closest(uploadSel);
  if (!block || containers.some((c) => c.contains(block) || block.contains(c))) continue;
  containers.push(block);
  views.push(describe(block, true));
}
return views;
"#;

/// `(container, errorSelector)` -> first visible, non-empty error text or `null`.
pub const FIELD_ERROR: &str = r#"
const [container, sel] = arguments;
for (const el of container.querySelectorAll(sel)) {
  const text = el.innerText.trim();
  if (text && (el.offsetParent || el.getClientRects().length)) return text;
}
return null;
"#;

/// `(errorSelector)` -> every visible, non-empty error text in the document.
/// The host page keeps resolved error nodes around, hidden or empty.
pub const ACTIVE_ERRORS: &str = r#"
return Array.from(document.querySelectorAll(arguments[0]))
  .filter((el) => el.offsetParent || el.getClientRects().length)
  .map((el) => el.innerText.trim())
  .filter((text) => text.length > 0);
"#;

/// `(select, text, placeholderTokens)` -> the option text selected, or `null`.
/// Exact text, then case-insensitive containment, then first real option.
pub const SELECT_OPTION: &str = r#"
const [select, wanted, placeholders] = arguments;
const options = Array.from(select.options);
const norm = (s) => s.trim().toLowerCase();
const isPlaceholder = (o) => !norm(o.text) || placeholders.some((p) => norm(o.text).includes(p));
const pick = options.find((o) => o.text.trim() === wanted.trim())
  || options.find((o) => norm(o.text).includes(norm(wanted)) && !isPlaceholder(o))
  || options.find((o) => !isPlaceholder(o));
if (!pick) return null;
select.value = pick.value;
pick.selected = true;
return pick.text.trim();
"#;

pub const SCROLL_BY: &str = "arguments[0].scrollBy(0, arguments[1]);";
pub const SCROLL_TO_END: &str = "arguments[0].scrollTo(0, arguments[0].scrollHeight);";
pub const UNHIDE: &str = "arguments[0].classList.remove('hidden');";
pub const BLUR_ACTIVE: &str = "if (document.activeElement) { document.activeElement.blur(); }";
