//! Operation taxonomy
//!
//! The closed set of operations a BDI node can perform, grouped by semantic
//! class:
//! - Meta (NOP, START, END, COMMENT, ASSERT, VERIFY_PROOF)
//! - Memory (ALLOC, FREE, LOAD, STORE, COPY, SET)
//! - Arithmetic, bitwise, logical, comparison
//! - Control flow (JUMP, BRANCH_COND, CALL, RETURN, SWITCH)
//! - Type conversion
//! - I/O (READ_PORT, WRITE_PORT, PRINT)
//! - Reserved concurrency primitives (errors at execution time)
//! - DSL / ML placeholders (lowered by front-ends, never executed directly)
//!
//! Wire encoding is the `u16` discriminant; [`OpCode::from_u16`] is the
//! inverse used by the graph deserializer.

use std::fmt;

/// Complete BDI operation set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u16)]
pub enum OpCode {
    // Meta
    Nop = 0,
    Start = 1,
    End = 2,
    Comment = 3,
    Assert = 4,
    VerifyProof = 5,

    // Memory
    Alloc = 6,
    Free = 7,
    Load = 8,
    Store = 9,
    Copy = 10,
    Set = 11,

    // Arithmetic
    Add = 12,
    Sub = 13,
    Mul = 14,
    Div = 15,
    Mod = 16,
    Neg = 17,
    Abs = 18,
    Inc = 19,
    Dec = 20,
    Fma = 21,

    // Bitwise
    And = 22,
    Or = 23,
    Xor = 24,
    Not = 25,
    Shl = 26,
    Shr = 27,
    Ashr = 28,
    Rol = 29,
    Ror = 30,
    Popcount = 31,
    Lzcnt = 32,
    Tzcnt = 33,

    // Logical (BOOL only)
    LAnd = 34,
    LOr = 35,
    LXor = 36,
    LNot = 37,

    // Comparison (result BOOL)
    Eq = 38,
    Ne = 39,
    Lt = 40,
    Le = 41,
    Gt = 42,
    Ge = 43,

    // Control flow
    Jump = 44,
    BranchCond = 45,
    Call = 46,
    Return = 47,
    Switch = 48,

    // Type conversion
    Trunc = 49,
    ExtendSign = 50,
    ExtendZero = 51,
    FloatToInt = 52,
    IntToFloat = 53,
    Bitcast = 54,

    // I/O
    ReadPort = 55,
    WritePort = 56,
    Print = 57,

    // Concurrency primitives (reserved)
    Spawn = 58,
    Join = 59,
    MutexLock = 60,
    MutexUnlock = 61,
    AtomicRmw = 62,
    ChanSend = 63,
    ChanRecv = 64,

    // DSL / high-level placeholders
    DslResolve = 65,
    LambdaCreate = 66,
    LambdaApply = 67,
    LearnUpdateParam = 68,
    FeedbackCalcError = 69,
    RecurPropagateState = 70,

    // Vector / linear-algebra placeholders
    VecAdd = 71,
    VecMul = 72,
    VecLoadPacked = 73,
    VecStorePacked = 74,
    VecShuffle = 75,
    GraphTraverse = 76,
    LinalgMatmul = 77,
    SignalFft = 78,
}

/// Semantic class of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OpCategory {
    Meta,
    Memory,
    Arithmetic,
    Bitwise,
    Logical,
    Comparison,
    Control,
    Conversion,
    Io,
    Concurrency,
    Placeholder,
}

impl OpCode {
    /// Get the semantic category of this operation
    pub fn category(self) -> OpCategory {
        use OpCode::*;
        match self {
            Nop | Start | End | Comment | Assert | VerifyProof => OpCategory::Meta,
            Alloc | Free | Load | Store | Copy | Set => OpCategory::Memory,
            Add | Sub | Mul | Div | Mod | Neg | Abs | Inc | Dec | Fma => OpCategory::Arithmetic,
            And | Or | Xor | Not | Shl | Shr | Ashr | Rol | Ror | Popcount | Lzcnt | Tzcnt => OpCategory::Bitwise,
            LAnd | LOr | LXor | LNot => OpCategory::Logical,
            Eq | Ne | Lt | Le | Gt | Ge => OpCategory::Comparison,
            Jump | BranchCond | Call | Return | Switch => OpCategory::Control,
            Trunc | ExtendSign | ExtendZero | FloatToInt | IntToFloat | Bitcast => OpCategory::Conversion,
            ReadPort | WritePort | Print => OpCategory::Io,
            Spawn | Join | MutexLock | MutexUnlock | AtomicRmw | ChanSend | ChanRecv => OpCategory::Concurrency,
            DslResolve | LambdaCreate | LambdaApply | LearnUpdateParam | FeedbackCalcError
            | RecurPropagateState | VecAdd | VecMul | VecLoadPacked | VecStorePacked | VecShuffle
            | GraphTraverse | LinalgMatmul | SignalFft => OpCategory::Placeholder,
        }
    }

    /// Does this operation route control flow itself?
    pub fn is_control_flow(self) -> bool {
        matches!(
            self,
            OpCode::Jump | OpCode::BranchCond | OpCode::Call | OpCode::Return | OpCode::Switch
        )
    }

    /// Reserved opcodes the interpreter must refuse to execute
    pub fn is_reserved(self) -> bool {
        matches!(self.category(), OpCategory::Concurrency | OpCategory::Placeholder)
    }

    /// Side-effect-free operations the constant folder may evaluate
    ///
    /// Output depends solely on input values; no memory, I/O, or control
    /// effects.
    pub fn is_fold_safe(self) -> bool {
        use OpCode::*;
        matches!(
            self,
            Add | Sub
                | Mul
                | Div
                | Mod
                | Neg
                | And
                | Or
                | Xor
                | Not
                | Eq
                | Ne
                | Lt
                | Le
                | Gt
                | Ge
                | LAnd
                | LOr
                | LXor
                | LNot
                | Trunc
                | ExtendSign
                | ExtendZero
                | FloatToInt
                | IntToFloat
                | Bitcast
        )
    }

    /// Decode a wire opcode, if it names an operation
    pub fn from_u16(raw: u16) -> Option<OpCode> {
        use OpCode::*;
        Some(match raw {
            0 => Nop,
            1 => Start,
            2 => End,
            3 => Comment,
            4 => Assert,
            5 => VerifyProof,
            6 => Alloc,
            7 => Free,
            8 => Load,
            9 => Store,
            10 => Copy,
            11 => Set,
            12 => Add,
            13 => Sub,
            14 => Mul,
            15 => Div,
            16 => Mod,
            17 => Neg,
            18 => Abs,
            19 => Inc,
            20 => Dec,
            21 => Fma,
            22 => And,
            23 => Or,
            24 => Xor,
            25 => Not,
            26 => Shl,
            27 => Shr,
            28 => Ashr,
            29 => Rol,
            30 => Ror,
            31 => Popcount,
            32 => Lzcnt,
            33 => Tzcnt,
            34 => LAnd,
            35 => LOr,
            36 => LXor,
            37 => LNot,
            38 => Eq,
            39 => Ne,
            40 => Lt,
            41 => Le,
            42 => Gt,
            43 => Ge,
            44 => Jump,
            45 => BranchCond,
            46 => Call,
            47 => Return,
            48 => Switch,
            49 => Trunc,
            50 => ExtendSign,
            51 => ExtendZero,
            52 => FloatToInt,
            53 => IntToFloat,
            54 => Bitcast,
            55 => ReadPort,
            56 => WritePort,
            57 => Print,
            58 => Spawn,
            59 => Join,
            60 => MutexLock,
            61 => MutexUnlock,
            62 => AtomicRmw,
            63 => ChanSend,
            64 => ChanRecv,
            65 => DslResolve,
            66 => LambdaCreate,
            67 => LambdaApply,
            68 => LearnUpdateParam,
            69 => FeedbackCalcError,
            70 => RecurPropagateState,
            71 => VecAdd,
            72 => VecMul,
            73 => VecLoadPacked,
            74 => VecStorePacked,
            75 => VecShuffle,
            76 => GraphTraverse,
            77 => LinalgMatmul,
            78 => SignalFft,
            _ => return None,
        })
    }

    /// Lowercase mnemonic for diagnostics
    pub fn name(self) -> &'static str {
        use OpCode::*;
        match self {
            Nop => "nop",
            Start => "start",
            End => "end",
            Comment => "comment",
            Assert => "assert",
            VerifyProof => "verify_proof",
            Alloc => "alloc",
            Free => "free",
            Load => "load",
            Store => "store",
            Copy => "copy",
            Set => "set",
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            Div => "div",
            Mod => "mod",
            Neg => "neg",
            Abs => "abs",
            Inc => "inc",
            Dec => "dec",
            Fma => "fma",
            And => "and",
            Or => "or",
            Xor => "xor",
            Not => "not",
            Shl => "shl",
            Shr => "shr",
            Ashr => "ashr",
            Rol => "rol",
            Ror => "ror",
            Popcount => "popcount",
            Lzcnt => "lzcnt",
            Tzcnt => "tzcnt",
            LAnd => "land",
            LOr => "lor",
            LXor => "lxor",
            LNot => "lnot",
            Eq => "eq",
            Ne => "ne",
            Lt => "lt",
            Le => "le",
            Gt => "gt",
            Ge => "ge",
            Jump => "jump",
            BranchCond => "branch_cond",
            Call => "call",
            Return => "return",
            Switch => "switch",
            Trunc => "trunc",
            ExtendSign => "extend_sign",
            ExtendZero => "extend_zero",
            FloatToInt => "float_to_int",
            IntToFloat => "int_to_float",
            Bitcast => "bitcast",
            ReadPort => "read_port",
            WritePort => "write_port",
            Print => "print",
            Spawn => "spawn",
            Join => "join",
            MutexLock => "mutex_lock",
            MutexUnlock => "mutex_unlock",
            AtomicRmw => "atomic_rmw",
            ChanSend => "chan_send",
            ChanRecv => "chan_recv",
            DslResolve => "dsl_resolve",
            LambdaCreate => "lambda_create",
            LambdaApply => "lambda_apply",
            LearnUpdateParam => "learn_update_param",
            FeedbackCalcError => "feedback_calc_error",
            RecurPropagateState => "recur_propagate_state",
            VecAdd => "vec_add",
            VecMul => "vec_mul",
            VecLoadPacked => "vec_load_packed",
            VecStorePacked => "vec_store_packed",
            VecShuffle => "vec_shuffle",
            GraphTraverse => "graph_traverse",
            LinalgMatmul => "linalg_matmul",
            SignalFft => "signal_fft",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ================================================================================================
// Tests
// ================================================================================================
