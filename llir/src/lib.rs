//! A small typed IR in the shape of LLVM's: modules own functions and globals,
//! functions own basic blocks, blocks own instructions ending in exactly one
//! terminator. [`verify`] enforces the structural invariants and `Display` on
//! [`Module`] writes LLVM textual IR.

pub mod builder;
pub mod cfg;
pub mod inst;
pub mod module;
pub mod print;
pub mod types;
pub mod value;
pub mod verify;

pub use builder::Builder;
pub use builder::InsertPoint;
pub use inst::Inst;
pub use inst::InstKind;
pub use inst::IntPredicate;
pub use module::Block;
pub use module::Function;
pub use module::Global;
pub use module::Initializer;
pub use module::Linkage;
pub use module::Module;
pub use types::FnType;
pub use types::Type;
pub use value::BlockId;
pub use value::Const;
pub use value::FuncId;
pub use value::GlobalId;
pub use value::InstId;
pub use value::Value;
pub use verify::verify;
pub use verify::VerifyError;
