use super::reject_runtime_name;
use super::Lowerer;
use super::Meta;
use crate::error::unsupported_feature;
use crate::error::LowerErrorType;
use crate::error::LowerResult;
use crate::symbol::FrameRef;
use crate::symbol::Storage;
use estree_js::ast::pat::Pat;
use estree_js::loc::Loc;
use llir::Global;
use llir::Type;
use llir::Value;

/// A name bound to storage, and the value it was just given.
#[derive(Clone, Debug)]
pub struct Binding {
  pub name: String,
  pub frame: FrameRef,
  pub storage: Storage,
  pub value: Value,
}

impl<'a> Lowerer<'a> {
  /// Lowers a binding target to the storage it names.
  pub(crate) fn lower_pat(&mut self, pat: &Pat, meta: Meta) -> LowerResult<Binding> {
    match pat {
      Pat::Identifier(id) => self.bind_name(&id.stx.name, meta.pending, id.loc),
      Pat::Rest(n) => Err(unsupported_feature(n.loc, "rest parameters")),
      // Defaults are only understood on parameters, which handle them before
      // getting here.
      Pat::Assignment(n) => {
        Err(LowerErrorType::UnsupportedPatternType(pat.kind().to_string()).at(n.loc))
      }
      Pat::Unsupported(n) => {
        Err(LowerErrorType::UnsupportedPatternType(n.stx.kind.clone()).at(n.loc))
      }
    }
  }

  /// Binds `name` in the current frame to `pending`. The first binding
  /// creates the slot; later ones store into it.
  pub(crate) fn bind_name(
    &mut self,
    name: &str,
    pending: Option<Value>,
    loc: Loc,
  ) -> LowerResult<Binding> {
    let Some(value) = pending else {
      return Err(LowerErrorType::UndeclaredVariable(name.to_string()).at(loc));
    };
    if let Some(sym) = self.symbols.current(name) {
      let storage = sym.storage;
      let binding = Binding {
        name: name.to_string(),
        frame: FrameRef::Current,
        storage,
        value,
      };
      self.store(&binding, value);
      return Ok(binding);
    }

    let (storage, known) = if self.symbols.in_function() {
      if name == "arguments" {
        return Err(unsupported_feature(loc, "the arguments object"));
      }
      let mut b = self.builder();
      let slot = b.build_entry_alloca(Type::Ptr);
      b.build_store(value, slot);
      (Storage::Local { slot }, None)
    } else {
      self.create_global(name, value, loc)?
    };
    self.symbols.declare(name, storage, None, known);
    Ok(Binding {
      name: name.to_string(),
      frame: FrameRef::Current,
      storage,
      value,
    })
  }

  fn create_global(
    &mut self,
    name: &str,
    value: Value,
    loc: Loc,
  ) -> LowerResult<(Storage, Option<Value>)> {
    reject_runtime_name(name, loc)?;
    if self.functions.contains_key(name) || self.module.get_function(name).is_some() {
      return Err(unsupported_feature(
        loc,
        format!("global variable `{name}` shares its name with a function"),
      ));
    }
    if self.module.get_global(name).is_some() {
      return Err(unsupported_feature(
        loc,
        format!("global variable `{name}` shares its name with a runtime symbol"),
      ));
    }
    // Constants bound in code that runs once go straight into the
    // initializer; anything else is stored at the point of declaration.
    let static_init = self.straight_line() && value.is_const();
    let init = if static_init { value } else { Value::null() };
    let global = self
      .module
      .add_global(Global::new(name, Type::Ptr).with_init(init));
    let storage = Storage::Global { global };
    if !static_init {
      self.builder().build_store(value, storage.address());
    }
    Ok((storage, static_init.then_some(value)))
  }

  /// Stores into an existing binding and keeps its known contents current.
  pub(crate) fn store(&mut self, binding: &Binding, value: Value) {
    self.builder().build_store(value, binding.storage.address());
    let known = (self.straight_line() && value.is_const()).then_some(value);
    self.symbols.set_known(binding.frame, &binding.name, known);
  }
}
