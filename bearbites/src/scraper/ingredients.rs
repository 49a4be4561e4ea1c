//! Ingredient tree construction.
//!
//! Two page shapes exist. Newer labels nest `<ul>/<li>` lists, with
//! annotations wrapped in `<em>`; older labels print one paragraph where
//! sub-ingredients sit in parentheses. Both produce the same tree.

use ::scraper::{ElementRef, Html, Node, Selector};

use super::text::{decode_entities, normalize_ws};
use crate::models::Ingredient;

/// Only lists under `ingred-list` count; `ingred-paragraph` is a different container.
const CONTAINER_LISTS: &str = ".ingred-list ul, .ingred-list ol";

/// Text gathered from one `<li>`, split by whether it sat inside emphasis.
#[derive(Default)]
struct ItemText {
    text: String,
    plain: bool,
    emphasized: bool,
}

impl ItemText {
    fn push(&mut self, text: &str, emphasized: bool) {
        if text.trim().is_empty() {
            return;
        }
        if emphasized {
            self.emphasized = true;
        } else {
            self.plain = true;
        }
        self.text.push_str(text);
        self.text.push(' ');
    }
}

fn is_list(element: &ElementRef<'_>) -> bool {
    matches!(element.value().name(), "ul" | "ol")
}

fn is_emphasis(element: &ElementRef<'_>) -> bool {
    matches!(element.value().name(), "em" | "i")
}

/// Collects an item's own text, descending into inline markup but not into
/// nested lists, which become children instead.
fn collect_item(element: ElementRef<'_>, emphasized: bool, text: &mut ItemText, children: &mut Vec<Ingredient>) {
    for child in element.children() {
        match child.value() {
            Node::Text(fragment) => text.push(fragment, emphasized),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_list(&child) {
                    children.extend(list_items(child));
                } else {
                    collect_item(child, emphasized || is_emphasis(&child), text, children);
                }
            }
            _ => {}
        }
    }
}

fn list_items(list: ElementRef<'_>) -> Vec<Ingredient> {
    let mut out = Vec::new();
    for child in list.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "li" => out.extend(list_item(child)),
            // Lists nested directly in a list belong to the enclosing level.
            "ul" | "ol" => out.extend(list_items(child)),
            other => tracing::trace!(tag = other, "Skipping non-item element in ingredient list"),
        }
    }
    out
}

/// Empty items contribute their children to the enclosing list.
fn list_item(item: ElementRef<'_>) -> Vec<Ingredient> {
    let mut text = ItemText::default();
    let mut children = Vec::new();
    collect_item(item, false, &mut text, &mut children);

    let name = normalize_ws(&text.text);
    let name = name.trim_end_matches([',', ';']).trim().to_string();
    if name.is_empty() {
        return children;
    }

    let node = if text.emphasized && !text.plain {
        Ingredient::note(name)
    } else {
        Ingredient::new(name)
    };
    vec![node.with_children(children)]
}

/// Build a tree from the first list inside a label page's ingredient-list
/// container, wherever it sits in that container. Trailing markup is ignored.
pub fn parse_ingredient_container(page: &str) -> Vec<Ingredient> {
    let selector = match Selector::parse(CONTAINER_LISTS) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::error!(error = ?e, "Invalid ingredient list selector");
            return Vec::new();
        }
    };

    let document = Html::parse_document(page);
    let tree = document.select(&selector).next().map(list_items).unwrap_or_default();
    tree
}

/// Build a tree from a flat "a, b (c, d), e" paragraph. Each parenthesised
/// or bracketed group becomes the children of the token before it.
pub fn parse_ingredient_text(text: &str) -> Vec<Ingredient> {
    let text = normalize_ws(&decode_entities(text));
    let text = text.trim_end_matches('.');

    let mut out = Vec::new();
    for token in split_top_level(text) {
        out.extend(parse_token(token));
    }
    out
}

/// Text outside top-level groups names the token; every top-level group,
/// including an unclosed trailing one, contributes children in order.
fn parse_token(token: &str) -> Vec<Ingredient> {
    let token = token.trim();
    if token.is_empty() {
        return Vec::new();
    }

    let mut name = String::new();
    let mut children = Vec::new();
    let mut depth = 0usize;
    let mut group_start = 0;
    for (i, ch) in token.char_indices() {
        match ch {
            '(' | '[' => {
                if depth == 0 {
                    group_start = i + ch.len_utf8();
                }
                depth += 1;
            }
            ')' | ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    children.extend(parse_ingredient_text(&token[group_start..i]));
                }
            }
            _ if depth == 0 => name.push(ch),
            _ => {}
        }
    }
    if depth > 0 {
        children.extend(parse_ingredient_text(&token[group_start..]));
    }

    let name = normalize_ws(&name);
    if name.is_empty() {
        return children;
    }

    let node = if name.starts_with('*') {
        Ingredient::note(name)
    } else {
        Ingredient::new(name)
    };
    vec![node.with_children(children)]
}

/// Split on commas that are not inside parentheses or brackets.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::flatten_ingredients;
    use pretty_assertions::assert_eq;

    fn parse_list(markup: &str) -> Vec<Ingredient> {
        parse_ingredient_container(&format!(r#"<div class="ingred-list">{markup}</div>"#))
    }

    #[test]
    fn test_paragraph_parenthetical_becomes_children() {
        let tree = parse_ingredient_text("Cheese (milk, enzymes), Salt.");
        assert_eq!(
            tree,
            vec![
                Ingredient::new("Cheese").with_children(vec![
                    Ingredient::new("milk"),
                    Ingredient::new("enzymes"),
                ]),
                Ingredient::new("Salt"),
            ]
        );
    }

    #[test]
    fn test_paragraph_nested_groups() {
        let tree = parse_ingredient_text("Tortilla (flour (wheat, niacin), water), Salsa [tomato, jalapeno]");
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "Tortilla");
        let flour = &tree[0].children.as_ref().unwrap()[0];
        assert_eq!(flour.name, "flour");
        assert_eq!(flour.children.as_ref().unwrap().len(), 2);
        assert_eq!(flatten_ingredients(&tree), "Tortilla, flour, wheat, niacin, water, Salsa, tomato, jalapeno");
    }

    #[test]
    fn test_paragraph_sibling_groups() {
        let tree = parse_ingredient_text("Seasoning (salt) (garlic, onion) blend, Rice");
        assert_eq!(
            tree,
            vec![
                Ingredient::new("Seasoning blend").with_children(vec![
                    Ingredient::new("salt"),
                    Ingredient::new("garlic"),
                    Ingredient::new("onion"),
                ]),
                Ingredient::new("Rice"),
            ]
        );
    }

    #[test]
    fn test_paragraph_note_and_unbalanced_parens() {
        let tree = parse_ingredient_text("Oats, *Organic, Sugar (cane");
        assert!(tree[1].is_note);
        assert_eq!(tree[2].name, "Sugar");
        assert_eq!(tree[2].children.as_ref().unwrap()[0].name, "cane");
    }

    #[test]
    fn test_nested_list_markup() {
        let html = r#"<div class="ingred-list"><ul>
            <li>Chicken</li>
            <li>Sauce
                <ul>
                    <li>Chili Peppers</li>
                    <li>Garlic</li>
                </ul>
            </li>
            <li><em>*Organic</em></li>
        </ul><p>after</p><ul><li>Ignored</li></ul></div>"#;

        let tree = parse_ingredient_container(html);
        assert_eq!(
            tree,
            vec![
                Ingredient::new("Chicken"),
                Ingredient::new("Sauce").with_children(vec![
                    Ingredient::new("Chili Peppers"),
                    Ingredient::new("Garlic"),
                ]),
                Ingredient::note("*Organic"),
            ]
        );
        assert_eq!(flatten_ingredients(&tree), "Chicken, Sauce, Chili Peppers, Garlic");
    }

    #[test]
    fn test_container_list_after_paragraph_container() {
        let page = r#"<html><body>
            <div class="ingred-paragraph"><p>Rice, Water</p></div>
            <div class="ingred-list"><ul><li>Sauce<ul><li>Chili</li></ul></li><li>Salt</li></ul></div>
        </body></html>"#;
        assert_eq!(
            parse_ingredient_container(page),
            vec![
                Ingredient::new("Sauce").with_children(vec![Ingredient::new("Chili")]),
                Ingredient::new("Salt"),
            ]
        );
    }

    #[test]
    fn test_container_list_after_inner_div() {
        let page = r#"<div class="ingred-list"><div class="hdr">Ingredients</div><ul><li>Beans</li><li>Lard</li></ul></div>"#;
        assert_eq!(
            parse_ingredient_container(page),
            vec![Ingredient::new("Beans"), Ingredient::new("Lard")]
        );
    }

    #[test]
    fn test_lists_outside_container_are_ignored() {
        let page = r#"<ul><li>Home</li></ul><div class="ingred-paragraph"><ul><li>Nav</li></ul></div>"#;
        assert!(parse_ingredient_container(page).is_empty());
    }

    #[test]
    fn test_list_with_unclosed_items() {
        let tree = parse_list("<UL><LI>Water<LI>Salt<UL><LI>iodide</UL><LI>Sugar</UL>");
        assert_eq!(
            tree,
            vec![
                Ingredient::new("Water"),
                Ingredient::new("Salt").with_children(vec![Ingredient::new("iodide")]),
                Ingredient::new("Sugar"),
            ]
        );
    }

    #[test]
    fn test_list_missing_or_truncated() {
        assert!(parse_list("<p>Water, salt</p>").is_empty());
        let tree = parse_list("<ul><li>Water</li><li>Salt");
        assert_eq!(tree, vec![Ingredient::new("Water"), Ingredient::new("Salt")]);
    }

    #[test]
    fn test_emphasis_inside_plain_item_is_not_a_note() {
        let tree = parse_list("<ul><li>Flour <em>(enriched)</em></li></ul>");
        assert_eq!(tree[0].name, "Flour (enriched)");
        assert!(!tree[0].is_note);
    }
}
