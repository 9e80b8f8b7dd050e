use ahash::HashMap;
use ahash::HashMapExt;
use llir::GlobalId;
use llir::Value;
use serde::Serialize;

/// Where a variable lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Storage {
  Global { global: GlobalId },
  /// An `alloca` in the entry block of the owning function.
  Local { slot: Value },
}

impl Storage {
  /// The address loads and stores go through.
  pub fn address(self) -> Value {
    match self {
      Storage::Global { global } => Value::Global(global),
      Storage::Local { slot } => slot,
    }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct Symbol {
  pub name: String,
  pub storage: Storage,
  /// Set for parameters: the zero-based IR parameter the slot was seeded from.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub param: Option<u32>,
  // Current contents when known to be a constant; lets straight-line reads
  // skip the load.
  #[serde(skip)]
  pub(crate) known: Option<Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
  Global,
  Function,
}

/// Names declared in one scope, in declaration order. A name maps to exactly
/// one symbol for the life of the frame.
#[derive(Clone, Debug, Serialize)]
pub struct Frame {
  pub kind: FrameKind,
  /// `None` for the global frame.
  pub function: Option<String>,
  pub symbols: Vec<Symbol>,
  #[serde(skip)]
  index: HashMap<String, usize>,
}

impl Frame {
  fn new(kind: FrameKind, function: Option<String>) -> Frame {
    Frame {
      kind,
      function,
      symbols: Vec::new(),
      index: HashMap::new(),
    }
  }

  pub fn get(&self, name: &str) -> Option<&Symbol> {
    self.index.get(name).map(|&i| &self.symbols[i])
  }

  fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
    self.index.get(name).map(|&i| &mut self.symbols[i])
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRef {
  Global,
  Current,
}

/// How a name resolves from the current frame.
#[derive(Clone, Debug)]
pub enum Lookup<'a> {
  Found(FrameRef, &'a Symbol),
  /// Declared in an enclosing function, which would need a closure.
  Enclosing,
  Missing,
}

/// Frame 0 holds globals. Each function being lowered pushes a frame, and
/// finished frames are kept for reporting.
#[derive(Debug)]
pub struct SymbolTable {
  stack: Vec<Frame>,
  finished: Vec<Frame>,
}

impl SymbolTable {
  pub fn new() -> SymbolTable {
    SymbolTable {
      stack: vec![Frame::new(FrameKind::Global, None)],
      finished: Vec::new(),
    }
  }

  pub fn in_function(&self) -> bool {
    self.stack.len() > 1
  }

  pub fn push_function(&mut self, name: &str) {
    self
      .stack
      .push(Frame::new(FrameKind::Function, Some(name.to_string())));
  }

  pub fn pop_function(&mut self) {
    if self.in_function() {
      if let Some(frame) = self.stack.pop() {
        self.finished.push(frame);
      }
    }
  }

  fn frame(&self, at: FrameRef) -> &Frame {
    match at {
      FrameRef::Global => &self.stack[0],
      FrameRef::Current => &self.stack[self.stack.len() - 1],
    }
  }

  fn frame_mut(&mut self, at: FrameRef) -> &mut Frame {
    let i = match at {
      FrameRef::Global => 0,
      FrameRef::Current => self.stack.len() - 1,
    };
    &mut self.stack[i]
  }

  pub fn current(&self, name: &str) -> Option<&Symbol> {
    self.frame(FrameRef::Current).get(name)
  }

  /// Current frame first, then globals. Frames of enclosing functions are
  /// not visible but are reported as such.
  pub fn lookup(&self, name: &str) -> Lookup<'_> {
    if let Some(sym) = self.frame(FrameRef::Current).get(name) {
      return Lookup::Found(FrameRef::Current, sym);
    }
    let enclosing = &self.stack[1..self.stack.len().saturating_sub(1).max(1)];
    if enclosing.iter().any(|f| f.get(name).is_some()) {
      return Lookup::Enclosing;
    }
    match self.frame(FrameRef::Global).get(name) {
      Some(sym) => Lookup::Found(FrameRef::Global, sym),
      None => Lookup::Missing,
    }
  }

  /// Declares `name` in the current frame. Returns the existing symbol
  /// instead if the name is already declared there.
  pub fn declare(
    &mut self,
    name: &str,
    storage: Storage,
    param: Option<u32>,
    known: Option<Value>,
  ) -> &Symbol {
    let frame = self.frame_mut(FrameRef::Current);
    let existing = frame.index.get(name).copied();
    let i = match existing {
      Some(i) => i,
      None => {
        let i = frame.symbols.len();
        frame.symbols.push(Symbol {
          name: name.to_string(),
          storage,
          param,
          known,
        });
        frame.index.insert(name.to_string(), i);
        i
      }
    };
    &frame.symbols[i]
  }

  /// Records what was just stored into `name`'s slot in frame `at`.
  pub fn set_known(&mut self, at: FrameRef, name: &str, known: Option<Value>) {
    if let Some(sym) = self.frame_mut(at).get_mut(name) {
      sym.known = known;
    }
  }

  /// Marks `name` in the current frame as seeded from IR parameter `index`.
  pub fn mark_param(&mut self, name: &str, index: u32) {
    if let Some(sym) = self.frame_mut(FrameRef::Current).get_mut(name) {
      sym.param = Some(index);
    }
  }

  pub fn globals(&self) -> &Frame {
    self.frame(FrameRef::Global)
  }

  /// Every frame: globals first, then function frames in the order they
  /// were finished.
  pub fn into_frames(self) -> Vec<Frame> {
    let mut stack = self.stack;
    stack.truncate(1);
    stack.extend(self.finished);
    stack
  }
}

impl Default for SymbolTable {
  fn default() -> Self {
    SymbolTable::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn global(i: u32) -> Storage {
    Storage::Global {
      global: GlobalId(i),
    }
  }

  #[test]
  fn one_symbol_per_name_per_frame() {
    let mut table = SymbolTable::new();
    table.declare("x", global(0), None, None);
    let again = table.declare("x", global(7), None, None);
    assert_eq!(again.storage, global(0));
    assert_eq!(table.globals().symbols.len(), 1);
  }

  #[test]
  fn function_frames_see_globals_but_not_enclosing_locals() {
    let mut table = SymbolTable::new();
    table.declare("g", global(0), None, None);
    table.push_function("outer");
    table.declare("a", global(1), None, None);
    assert!(matches!(table.lookup("a"), Lookup::Found(FrameRef::Current, _)));
    table.push_function("inner");
    assert!(matches!(table.lookup("a"), Lookup::Enclosing));
    assert!(matches!(table.lookup("g"), Lookup::Found(FrameRef::Global, _)));
    assert!(matches!(table.lookup("zzz"), Lookup::Missing));
    table.pop_function();
    table.pop_function();
    assert!(!table.in_function());

    let frames = table.into_frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[1].function.as_deref(), Some("inner"));
    assert_eq!(frames[2].function.as_deref(), Some("outer"));
  }

  #[test]
  fn global_frame_reads_its_own_names() {
    let mut table = SymbolTable::new();
    table.declare("x", global(0), None, Some(Value::null()));
    assert!(matches!(
      table.lookup("x"),
      Lookup::Found(FrameRef::Current, sym) if sym.known == Some(Value::null())
    ));
    table.set_known(FrameRef::Current, "x", None);
    assert_eq!(table.current("x").unwrap().known, None);
  }
}
