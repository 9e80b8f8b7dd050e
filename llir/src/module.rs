use crate::cfg;
use crate::inst::Inst;
use crate::types::FnType;
use crate::types::Type;
use crate::value::BlockId;
use crate::value::FuncId;
use crate::value::GlobalId;
use crate::value::InstId;
use crate::value::Value;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
  #[default]
  External,
  Internal,
  Private,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Initializer {
  /// Must be a constant: a `Const`, a global address or a function address.
  Value(Value),
  /// Raw bytes of a `[N x i8]` constant, NUL terminator included.
  CString(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Global {
  pub name: String,
  /// Type of the contents, not of the global itself (which is always `ptr`).
  pub ty: Type,
  pub linkage: Linkage,
  pub constant: bool,
  pub unnamed_addr: bool,
  /// `None` declares a global defined elsewhere.
  pub init: Option<Initializer>,
}

impl Global {
  pub fn new(name: impl Into<String>, ty: Type) -> Global {
    Global {
      name: name.into(),
      ty,
      linkage: Linkage::External,
      constant: false,
      unnamed_addr: false,
      init: None,
    }
  }

  pub fn with_init(mut self, value: Value) -> Global {
    self.init = Some(Initializer::Value(value));
    self
  }

  pub fn with_linkage(mut self, linkage: Linkage) -> Global {
    self.linkage = linkage;
    self
  }

  pub fn is_declaration(&self) -> bool {
    self.init.is_none()
  }

  /// The scalar initial value, if any.
  pub fn initial_value(&self) -> Option<Value> {
    match &self.init {
      Some(Initializer::Value(v)) => Some(*v),
      _ => None,
    }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct Block {
  pub name: String,
  pub insts: Vec<InstId>,
}

/// A function and the arena of its blocks and instructions. A function with
/// no blocks in its layout is a declaration.
#[derive(Clone, Debug, Serialize)]
pub struct Function {
  pub name: String,
  pub ty: FnType,
  pub linkage: Linkage,
  blocks: Vec<Block>,
  layout: Vec<BlockId>,
  insts: Vec<Inst>,
}

impl Function {
  pub fn new(name: impl Into<String>, ty: FnType, linkage: Linkage) -> Function {
    Function {
      name: name.into(),
      ty,
      linkage,
      blocks: Vec::new(),
      layout: Vec::new(),
      insts: Vec::new(),
    }
  }

  pub fn is_declaration(&self) -> bool {
    self.layout.is_empty()
  }

  pub fn entry(&self) -> Option<BlockId> {
    self.layout.first().copied()
  }

  /// Blocks in layout order.
  pub fn layout(&self) -> &[BlockId] {
    &self.layout
  }

  pub fn block(&self, id: BlockId) -> &Block {
    &self.blocks[id.0 as usize]
  }

  pub fn inst(&self, id: InstId) -> &Inst {
    &self.insts[id.0 as usize]
  }

  pub fn block_insts(&self, id: BlockId) -> impl Iterator<Item = (InstId, &Inst)> + '_ {
    self
      .block(id)
      .insts
      .iter()
      .map(|&inst| (inst, self.inst(inst)))
  }

  /// The last instruction of the block, if it is a terminator.
  pub fn terminator(&self, id: BlockId) -> Option<&Inst> {
    let last = *self.block(id).insts.last()?;
    Some(self.inst(last)).filter(|inst| inst.is_terminator())
  }

  pub fn is_terminated(&self, id: BlockId) -> bool {
    self.terminator(id).is_some()
  }

  /// Appends a block to the layout. Labels are made unique by suffixing a
  /// counter, e.g. a second `forin.cond` becomes `forin.cond1`.
  pub fn append_block(&mut self, name: &str) -> BlockId {
    let taken: HashSet<&str> = self.blocks.iter().map(|b| b.name.as_str()).collect();
    let mut unique = name.to_string();
    let mut suffix = 1;
    while taken.contains(unique.as_str()) {
      unique = format!("{name}{suffix}");
      suffix += 1;
    }
    let id = BlockId(self.blocks.len() as u32);
    self.blocks.push(Block {
      name: unique,
      insts: Vec::new(),
    });
    self.layout.push(id);
    id
  }

  pub(crate) fn push_inst(&mut self, block: BlockId, inst: Inst) -> InstId {
    let id = InstId(self.insts.len() as u32);
    self.insts.push(inst);
    self.blocks[block.0 as usize].insts.push(id);
    id
  }

  pub(crate) fn insert_inst(&mut self, block: BlockId, at: usize, inst: Inst) -> InstId {
    let id = InstId(self.insts.len() as u32);
    self.insts.push(inst);
    self.blocks[block.0 as usize].insts.insert(at, id);
    id
  }

  /// Type of a value as seen from inside this function, or `None` if it
  /// refers to a parameter or instruction that does not exist.
  pub fn value_type(&self, value: Value) -> Option<Type> {
    match value {
      Value::Param(i) => self.ty.params.get(i as usize).copied(),
      Value::Inst(id) => self.insts.get(id.0 as usize).map(|inst| inst.ty),
      _ => value.const_type(),
    }
  }

  /// Drops blocks not reachable from the entry block and returns how many
  /// were removed.
  pub fn remove_unreachable_blocks(&mut self) -> usize {
    let Some(entry) = self.entry() else {
      return 0;
    };
    let reachable = cfg::reachable(self, entry);
    let before = self.layout.len();
    self.layout.retain(|b| reachable.contains(b));
    before - self.layout.len()
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct Module {
  pub name: String,
  functions: Vec<Function>,
  globals: Vec<Global>,
  #[serde(skip)]
  cstrings: HashMap<Vec<u8>, GlobalId>,
}

impl Module {
  pub fn new(name: impl Into<String>) -> Module {
    Module {
      name: name.into(),
      functions: Vec::new(),
      globals: Vec::new(),
      cstrings: HashMap::new(),
    }
  }

  pub fn add_function(&mut self, name: impl Into<String>, ty: FnType, linkage: Linkage) -> FuncId {
    let id = FuncId(self.functions.len() as u32);
    self.functions.push(Function::new(name, ty, linkage));
    id
  }

  pub fn get_function(&self, name: &str) -> Option<FuncId> {
    self
      .functions
      .iter()
      .position(|f| f.name == name)
      .map(|i| FuncId(i as u32))
  }

  /// Looks up a function by name, declaring it with `ty` if absent. An
  /// existing function is returned as is, whatever its type.
  pub fn get_or_insert_function(&mut self, name: &str, ty: FnType) -> FuncId {
    match self.get_function(name) {
      Some(id) => id,
      None => self.add_function(name, ty, Linkage::External),
    }
  }

  pub fn function(&self, id: FuncId) -> &Function {
    &self.functions[id.0 as usize]
  }

  pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
    &mut self.functions[id.0 as usize]
  }

  pub fn functions(&self) -> impl Iterator<Item = (FuncId, &Function)> + '_ {
    self
      .functions
      .iter()
      .enumerate()
      .map(|(i, f)| (FuncId(i as u32), f))
  }

  pub fn add_global(&mut self, global: Global) -> GlobalId {
    let id = GlobalId(self.globals.len() as u32);
    self.globals.push(global);
    id
  }

  pub fn get_global(&self, name: &str) -> Option<GlobalId> {
    self
      .globals
      .iter()
      .position(|g| g.name == name)
      .map(|i| GlobalId(i as u32))
  }

  pub fn global(&self, id: GlobalId) -> &Global {
    &self.globals[id.0 as usize]
  }

  pub fn global_mut(&mut self, id: GlobalId) -> &mut Global {
    &mut self.globals[id.0 as usize]
  }

  pub fn globals(&self) -> impl Iterator<Item = (GlobalId, &Global)> + '_ {
    self
      .globals
      .iter()
      .enumerate()
      .map(|(i, g)| (GlobalId(i as u32), g))
  }

  /// Returns the private NUL-terminated constant holding `text`, creating it
  /// on first use. Constants are named `.str`, `.str.1`, `.str.2`, ...
  pub fn intern_cstring(&mut self, text: &str) -> GlobalId {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    if let Some(&id) = self.cstrings.get(&bytes) {
      return id;
    }
    let name = match self.cstrings.len() {
      0 => ".str".to_string(),
      n => format!(".str.{n}"),
    };
    let id = self.add_global(Global {
      name,
      ty: Type::Bytes(bytes.len() as u64),
      linkage: Linkage::Private,
      constant: true,
      unnamed_addr: true,
      init: Some(Initializer::CString(bytes.clone())),
    });
    self.cstrings.insert(bytes, id);
    id
  }
}
