//! Diagnostics attached to the textual origin of model elements.

use std::{
    fmt::{Debug, Display},
    ops::Range,
    sync::Arc,
};

use crate::{Environment, Input};
use annotate_snippets::*;
use thiserror::Error;

pub type Res<T> = Result<T, Message>;

/// A range of characters of an input, used to point at the origin of an element.
#[derive(Clone)]
pub struct Span {
    input: Arc<Input>,
    range: Range<usize>,
}

impl Span {
    /// Span covering the characters `first` to `last` (inclusive) of the input.
    pub fn new(input: Arc<Input>, first: usize, last: usize) -> Self {
        Span {
            input,
            range: first..(last + 1),
        }
    }

    /// Span covering a whole input built from `text`.
    fn detached(text: String) -> Self {
        let range = 0..text.len();
        Span {
            input: Arc::new(Input::from_string(text)),
            range,
        }
    }

    pub fn str(&self) -> &str {
        &self.input.text[self.range.clone()]
    }

    pub fn label(&self, level: Level<'static>, text: impl ToString) -> Label {
        Label {
            level,
            span: self.clone(),
            text: text.to_string(),
        }
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.range)
    }
}

/// An element that may be attached to a location in an input.
///
/// Elements without a known origin are rendered from their own textual representation.
pub trait Spanned: Display {
    fn span(&self) -> Option<&Span>;

    fn span_or_default(&self) -> Span {
        match self.span() {
            Some(span) => span.clone(),
            None => Span::detached(self.to_string()),
        }
    }

    /// Error message pointing at this element.
    fn invalid(&self, msg: impl ToString) -> Message {
        let msg = msg.to_string();
        let span = self.span_or_default();
        // short elements are repeated in the title
        let title = if span.range.len() < 40 {
            format!("{msg}: {}", span.str())
        } else {
            msg.clone()
        };
        Message::error(title).snippet(span.label(Level::ERROR, msg))
    }

    fn label(&self, level: Level<'static>, text: impl ToString) -> Label {
        self.span_or_default().label(level, text)
    }
}

impl<T: Spanned + ?Sized> Spanned for &T {
    fn span(&self) -> Option<&Span> {
        (**self).span()
    }
}

/// Text attached to a span of some input.
pub struct Label {
    level: Level<'static>,
    span: Span,
    text: String,
}

impl Label {
    fn snippet(&self) -> Snippet<'_, Annotation<'_>> {
        let kind = match self.level {
            Level::ERROR => AnnotationKind::Primary,
            _ => AnnotationKind::Context,
        };
        let snippet = Snippet::source(&self.span.input.text)
            .line_start(1)
            .fold(true)
            .annotation(kind.span(self.span.range.clone()).label(&self.text));
        match self.span.input.source.as_ref() {
            Some(file) => snippet.path(file.as_str()),
            None => snippet,
        }
    }
}

/// A diagnostic: a title, labeled snippets of the inputs and free-form notes.
#[derive(Error)]
pub struct Message {
    level: Level<'static>,
    title: String,
    labels: Vec<Label>,
    notes: Vec<String>,
}

impl Message {
    pub fn new(level: Level<'static>, title: impl ToString) -> Self {
        Self {
            level,
            title: title.to_string(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn error(title: impl ToString) -> Self {
        Self::new(Level::ERROR, title)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn snippet(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Points at another element related to the error.
    pub fn info(self, elem: impl Spanned, text: &str) -> Message {
        let label = elem.label(Level::INFO, text);
        self.snippet(label)
    }

    pub fn ctx(mut self, note: impl ToString) -> Message {
        self.notes.push(note.to_string());
        self
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let group = self
            .level
            .clone()
            .primary_title(&self.title)
            .elements(self.labels.iter().map(|l| l.snippet()));
        f.write_str(&Renderer::styled().render(&[group]))?;
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}

impl Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// An error that needs the environment to be turned into a [`Message`].
pub(crate) trait ToEnvMessage {
    fn to_message(self, env: &Environment) -> Message;
}

pub(crate) trait EnvError<T> {
    fn msg(self, env: &Environment) -> Res<T>;
}

impl<T, E: ToEnvMessage> EnvError<T> for Result<T, E> {
    fn msg(self, env: &Environment) -> Res<T> {
        self.map_err(|e| e.to_message(env))
    }
}
