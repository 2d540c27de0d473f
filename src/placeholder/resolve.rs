//! Placeholder resolution
//!
//! Resolves a parsed template against an [`Environment`] of inputs, outputs
//! and params. Output path expressions are resolved lazily and memoised, so
//! an output may refer to other outputs of the same task in any order.

use crate::error::{PlaceholderError, PlaceholderResult, PortKind};
use crate::placeholder::{apply_modifiers, parse, PathMap, Segment, TEMP_SUFFIX};
use std::collections::BTreeMap;

static EMPTY: PathMap = BTreeMap::new();

/// The result of resolving a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Template with every placeholder replaced by its concrete value
    pub resolved: String,

    /// Same as `resolved`, but top-level output placeholders without modifiers
    /// point at `<path>.tmp`
    pub temp: String,

    /// Every output in the environment plus every output declared in the template
    pub outputs: PathMap,
}

/// The values placeholders resolve against
#[derive(Debug, Clone, Copy)]
pub struct Environment<'a> {
    /// Input name to concrete path
    pub inputs: &'a PathMap,

    /// Output name to (unresolved) path expression
    pub outputs: &'a PathMap,

    /// Param name to plain value
    pub params: &'a PathMap,
}

impl<'a> Environment<'a> {
    /// Create an environment without params
    pub fn new(inputs: &'a PathMap, outputs: &'a PathMap) -> Self {
        Environment {
            inputs,
            outputs,
            params: &EMPTY,
        }
    }

    /// Set params
    pub fn with_params(mut self, params: &'a PathMap) -> Self {
        self.params = params;
        self
    }

    /// Resolve a template
    pub fn resolve(&self, template: &str) -> PlaceholderResult<Resolution> {
        let segments = parse(template)?;

        let mut resolver = Resolver::new(*self);
        resolver.collect_declarations(&segments)?;

        let resolved = resolver.render(&segments, false)?;
        let temp = resolver.render(&segments, true)?;
        let outputs = resolver.finish()?;

        Ok(Resolution {
            resolved,
            temp,
            outputs,
        })
    }

    /// Resolve only the output path expressions
    pub fn resolve_outputs(&self) -> PlaceholderResult<PathMap> {
        Resolver::new(*self).finish()
    }

    /// Resolve `[p:..]` placeholders in the input paths
    pub fn resolve_inputs(&self) -> PlaceholderResult<PathMap> {
        let params_only = Environment::new(&EMPTY, &EMPTY).with_params(self.params);

        self.inputs
            .iter()
            .map(|(name, path)| Ok((name.clone(), params_only.resolve(path)?.resolved)))
            .collect()
    }
}

/// Resolve a template against inputs and output path expressions
pub fn resolve(
    template: &str,
    inputs: &PathMap,
    outputs: &PathMap,
) -> PlaceholderResult<Resolution> {
    Environment::new(inputs, outputs).resolve(template)
}

struct Resolver<'a> {
    env: Environment<'a>,
    /// Output declarations found in the template, by name
    declared: BTreeMap<String, Vec<Segment>>,
    /// Outputs resolved so far
    resolved: PathMap,
    /// Outputs currently being resolved, innermost last
    pending: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(env: Environment<'a>) -> Self {
        Resolver {
            env,
            declared: BTreeMap::new(),
            resolved: PathMap::new(),
            pending: Vec::new(),
        }
    }

    fn collect_declarations(&mut self, segments: &[Segment]) -> PlaceholderResult<()> {
        for segment in segments {
            if let Segment::Output {
                name,
                path: Some(path),
                ..
            } = segment
            {
                match self.declared.get(name) {
                    Some(existing) if existing != path => {
                        return Err(PlaceholderError::ConflictingOutput(name.clone()));
                    }
                    Some(_) => {}
                    None => {
                        self.declared.insert(name.clone(), path.clone());
                    }
                }
                self.collect_declarations(path)?;
            }
        }
        Ok(())
    }

    /// Resolve any outputs not yet touched and hand back the full mapping
    fn finish(mut self) -> PlaceholderResult<PathMap> {
        let names: Vec<String> = self
            .env
            .outputs
            .keys()
            .chain(self.declared.keys())
            .cloned()
            .collect();

        for name in names {
            self.output(&name)?;
        }

        Ok(self.resolved)
    }

    fn output(&mut self, name: &str) -> PlaceholderResult<String> {
        if let Some(path) = self.resolved.get(name) {
            return Ok(path.clone());
        }

        let segments = match self.declared.get(name) {
            Some(segments) => segments.clone(),
            None => match self.env.outputs.get(name) {
                Some(expr) => parse(expr)?,
                None => {
                    return Err(PlaceholderError::UnknownReference {
                        kind: PortKind::Output,
                        name: name.to_string(),
                    })
                }
            },
        };

        self.declare(name, &segments)
    }

    fn declare(&mut self, name: &str, segments: &[Segment]) -> PlaceholderResult<String> {
        if self.pending.iter().any(|pending| pending == name) {
            let mut chain = self.pending.clone();
            chain.push(name.to_string());
            return Err(PlaceholderError::CyclicReference(chain.join(" -> ")));
        }

        self.pending.push(name.to_string());
        let path = self.render(segments, false);
        self.pending.pop();

        let path = path?;
        if path.is_empty() {
            return Err(PlaceholderError::EmptyOutput(name.to_string()));
        }
        self.resolved.insert(name.to_string(), path.clone());
        Ok(path)
    }

    fn render(&mut self, segments: &[Segment], temp: bool) -> PlaceholderResult<String> {
        let mut out = String::new();

        for segment in segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Input { name, modifiers } => {
                    let value = lookup(self.env.inputs, PortKind::Input, name)?;
                    out.push_str(&apply_modifiers(modifiers, value));
                }
                Segment::Param { name, modifiers } => {
                    let value = lookup(self.env.params, PortKind::Param, name)?;
                    out.push_str(&apply_modifiers(modifiers, value));
                }
                Segment::Output {
                    name,
                    path,
                    modifiers,
                } => {
                    let value = match path {
                        // Declarations nested in an output map expression are not
                        // collected up front, so resolve them in place.
                        Some(path)
                            if !self.declared.contains_key(name)
                                && !self.resolved.contains_key(name) =>
                        {
                            self.declare(name, path)?
                        }
                        _ => self.output(name)?,
                    };
                    out.push_str(&apply_modifiers(modifiers, &value));
                    // A modified reference names a derived path, not the output itself
                    if temp && modifiers.is_empty() {
                        out.push_str(TEMP_SUFFIX);
                    }
                }
            }
        }

        Ok(out)
    }
}

/// Look up a name in a port map
pub fn lookup<'m>(map: &'m PathMap, kind: PortKind, name: &str) -> PlaceholderResult<&'m str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| PlaceholderError::UnknownReference {
            kind,
            name: name.to_string(),
        })
}
