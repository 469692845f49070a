//! A reference engine that needs no browser: it checks that a sketch is
//! structurally sound, honours `size(w, h)`, and counts frames.

use crate::protocol::Size;

use super::engine::{EngineError, ExecutionEngine, OutputSurface};

pub const DEFAULT_SIZE: Size = Size::new(100.0, 100.0);

#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessSurface {
    initial_size: Size,
    size: Size,
    generation: u64,
    frames_drawn: u64,
}

impl HeadlessSurface {
    pub fn new(size: Size) -> Self {
        Self {
            initial_size: size,
            size,
            generation: 0,
            frames_drawn: 0,
        }
    }

    /// How many times the surface has been replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Frames drawn since the last rebuild.
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl OutputSurface for HeadlessSurface {
    fn rebuild(&mut self) {
        self.size = self.initial_size;
        self.generation += 1;
        self.frames_drawn = 0;
    }

    fn size(&self) -> Size {
        self.size
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeadlessInstance {
    pub looping: bool,
    pub frame: u64,
}

/// Counts every lifecycle call so callers can see exactly what the
/// renderer asked of it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HeadlessEngine {
    pub starts: u32,
    pub resumes: u32,
    pub pauses: u32,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutionEngine for HeadlessEngine {
    type Surface = HeadlessSurface;
    type Instance = HeadlessInstance;

    fn start(
        &mut self,
        surface: &mut HeadlessSurface,
        code: &str,
    ) -> Result<HeadlessInstance, EngineError> {
        self.starts += 1;
        check_delimiters(code)?;

        if let Some(size) = requested_size(code) {
            surface.resize(size);
        }

        Ok(HeadlessInstance {
            looping: true,
            frame: 0,
        })
    }

    fn resume(&mut self, instance: &mut HeadlessInstance) {
        self.resumes += 1;
        instance.looping = true;
    }

    fn pause(&mut self, instance: &mut HeadlessInstance) {
        self.pauses += 1;
        instance.looping = false;
    }

    fn step(
        &mut self,
        surface: &mut HeadlessSurface,
        instance: &mut HeadlessInstance,
    ) -> Result<(), EngineError> {
        if instance.looping {
            instance.frame += 1;
            surface.frames_drawn += 1;
        }
        Ok(())
    }
}

fn check_delimiters(code: &str) -> Result<(), EngineError> {
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut chars = code.chars().peekable();
    let mut line = 1;

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => line += 1,
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = ' ';
                let mut closed = false;
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        line += 1;
                    }
                    if previous == '*' && skipped == '/' {
                        closed = true;
                        break;
                    }
                    previous = skipped;
                }
                if !closed {
                    return Err(EngineError::new(format!(
                        "syntax error: unterminated comment on line {}",
                        line
                    )));
                }
            }
            '"' | '\'' => {
                let quote = ch;
                let start = line;
                let mut closed = false;
                while let Some(inner) = chars.next() {
                    match inner {
                        '\\' => {
                            chars.next();
                        }
                        '\n' => break,
                        _ if inner == quote => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return Err(EngineError::new(format!(
                        "syntax error: unterminated string on line {}",
                        start
                    )));
                }
            }
            '(' | '[' | '{' => open.push((ch, line)),
            ')' | ']' | '}' => match open.pop() {
                Some((opener, _)) if closing_for(opener) == ch => {}
                _ => {
                    return Err(EngineError::new(format!(
                        "syntax error: unexpected '{}' on line {}",
                        ch, line
                    )));
                }
            },
            _ => {}
        }
    }

    match open.pop() {
        Some((opener, opened_on)) => Err(EngineError::new(format!(
            "syntax error: unclosed '{}' from line {}",
            opener, opened_on
        ))),
        None => Ok(()),
    }
}

fn closing_for(opener: char) -> char {
    match opener {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// First `size(w, h)` call in the sketch, if any.
fn requested_size(code: &str) -> Option<Size> {
    let mut search_from = 0;

    while let Some(offset) = code[search_from..].find("size(") {
        let start = search_from + offset;
        search_from = start + "size(".len();

        let preceded_by_ident = code[..start]
            .chars()
            .next_back()
            .is_some_and(|ch| ch.is_alphanumeric() || ch == '_' || ch == '.');
        if preceded_by_ident {
            continue;
        }

        let args_end = code[search_from..].find(')')?;
        let args = &code[search_from..search_from + args_end];
        let mut parts = args.split(',').map(str::trim);

        let width = parts.next().and_then(|w| w.parse::<f64>().ok());
        let height = parts.next().and_then(|h| h.parse::<f64>().ok());

        if let (Some(width), Some(height)) = (width, height) {
            let size = Size::new(width, height);
            if size.is_valid() {
                return Some(size);
            }
        }
    }

    None
}
