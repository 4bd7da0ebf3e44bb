use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
}

impl SelectorStep {
    pub(crate) fn id_only(&self) -> Option<&str> {
        if !self.universal && self.tag.is_none() && self.classes.is_empty() && self.attrs.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // Relation to previous (left) selector part.
    pub(crate) combinator: Option<SelectorCombinator>,
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    let mut groups = Vec::new();
    for group in split_selector_groups(selector)? {
        groups.push(parse_selector_chain(&group)?);
    }
    if groups.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(groups)
}

fn split_selector_groups(selector: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for ch in selector.chars() {
        match (quote, ch) {
            (Some(q), _) if ch == q => {
                quote = None;
                current.push(ch);
            }
            (Some(_), _) => current.push(ch),
            (None, '\'') | (None, '"') => {
                quote = Some(ch);
                current.push(ch);
            }
            (None, '[') => {
                in_brackets = true;
                current.push(ch);
            }
            (None, ']') => {
                in_brackets = false;
                current.push(ch);
            }
            (None, ',') if !in_brackets => {
                if current.trim().is_empty() {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                out.push(std::mem::take(&mut current));
            }
            (None, _) => current.push(ch),
        }
    }

    if quote.is_some() || in_brackets {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    if current.trim().is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    out.push(current);
    Ok(out)
}

pub(crate) fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let tokens = tokenize_selector(selector)?;
    let mut steps: Vec<SelectorPart> = Vec::new();
    let mut pending_combinator: Option<SelectorCombinator> = None;

    for token in tokens {
        if token == ">" {
            if pending_combinator.is_some() || steps.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            pending_combinator = Some(SelectorCombinator::Child);
            continue;
        }

        let step = parse_selector_step(&token, selector)?;
        let combinator = if steps.is_empty() {
            None
        } else {
            Some(pending_combinator.unwrap_or(SelectorCombinator::Descendant))
        };
        pending_combinator = None;
        steps.push(SelectorPart { step, combinator });
    }

    if pending_combinator.is_some() || steps.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(steps)
}

fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for ch in selector.chars() {
        match (quote, ch) {
            (Some(q), _) if ch == q => {
                quote = None;
                current.push(ch);
            }
            (Some(_), _) => current.push(ch),
            (None, '\'') | (None, '"') if in_brackets => {
                quote = Some(ch);
                current.push(ch);
            }
            (None, '[') => {
                in_brackets = true;
                current.push(ch);
            }
            (None, ']') => {
                in_brackets = false;
                current.push(ch);
            }
            (None, '>') if !in_brackets => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(">".to_string());
            }
            (None, _) if ch.is_whitespace() && !in_brackets => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            (None, _) => current.push(ch),
        }
    }

    if quote.is_some() || in_brackets {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    if tokens.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(tokens)
}

fn parse_selector_step(token: &str, selector: &str) -> Result<SelectorStep> {
    let mut step = SelectorStep::default();
    let chars: Vec<char> = token.chars().collect();
    let mut i = 0usize;

    if i < chars.len() && chars[i] == '*' {
        step.universal = true;
        i += 1;
    } else if i < chars.len() && is_ident_start(chars[i]) {
        let start = i;
        while i < chars.len() && is_ident_char(chars[i]) {
            i += 1;
        }
        step.tag = Some(
            chars[start..i]
                .iter()
                .collect::<String>()
                .to_ascii_lowercase(),
        );
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                if start == i {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                step.id = Some(chars[start..i].iter().collect());
            }
            '.' => {
                i += 1;
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                if start == i {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                step.classes.push(chars[start..i].iter().collect());
            }
            '[' => {
                let end = chars[i..]
                    .iter()
                    .position(|ch| *ch == ']')
                    .map(|offset| i + offset)
                    .ok_or_else(|| Error::UnsupportedSelector(selector.into()))?;
                let body: String = chars[i + 1..end].iter().collect();
                step.attrs.push(parse_attr_condition(&body, selector)?);
                i = end + 1;
            }
            _ => return Err(Error::UnsupportedSelector(selector.into())),
        }
    }

    if !step.universal
        && step.tag.is_none()
        && step.id.is_none()
        && step.classes.is_empty()
        && step.attrs.is_empty()
    {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(step)
}

fn parse_attr_condition(body: &str, selector: &str) -> Result<SelectorAttrCondition> {
    let body = body.trim();
    if body.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let Some((raw_key, raw_value)) = body.split_once('=') else {
        return Ok(SelectorAttrCondition::Exists {
            key: body.to_ascii_lowercase(),
        });
    };

    let key = raw_key.trim().to_ascii_lowercase();
    if key.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let mut value = raw_value.trim();
    if (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2)
        || (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
    {
        value = &value[1..value.len() - 1];
    }

    Ok(SelectorAttrCondition::Eq {
        key,
        value: value.to_string(),
    })
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}
