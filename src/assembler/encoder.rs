//! Instruction encoder for the 6502 assembler
//!
//! The resolve pass walks classified lines with a running program counter,
//! assigning label addresses as it reaches them and encoding every
//! instruction and data item. Values that name a label the pass has not
//! reached yet are emitted as placeholder bytes plus a [`Patch`]; the
//! backpatch pass fills those in once every label has an address.
//!
//! Forward references are always encoded at absolute width, since their size
//! must be fixed before their value is known.

use crate::addressing::AddressingMode;
use crate::assembler::parser::{
    parse_value, Atom, ByteSelector, CodeToken, CodeTokenKind, DataDirective, DataItem,
    OperandSyntax, Value,
};
use crate::assembler::symbol_table::{Labels, Variables};
use crate::assembler::{AssemblerError, ErrorType};
use crate::opcodes::{lookup, supports, Mnemonic};

/// How a patch writes a label address into its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    /// Branch displacement from the end of the instruction
    Relative,
    /// Whole address, which must fit in one byte
    Byte,
    /// Low byte of the address
    Low,
    /// High byte of the address
    High,
    /// Little-endian word
    Word,
}

/// A pending reference to a label whose address was unknown when encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub label: String,
    /// Index into [`InstructionToken::bytes`]
    pub offset: usize,
    pub kind: PatchKind,
}

/// Encoded instruction or data item at a fixed address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionToken {
    /// 1-indexed source line
    pub line: usize,
    /// Address of the first byte
    pub pc: u16,
    /// Opcode for instructions, `None` for data
    pub opcode: Option<u8>,
    /// Complete encoding, opcode included
    pub bytes: Vec<u8>,
    /// References still to fill in; empty once backpatched
    pub patches: Vec<Patch>,
}

impl InstructionToken {
    pub fn is_pending(&self) -> bool {
        !self.patches.is_empty()
    }
}

/// Result of evaluating a value expression during the resolve pass.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolved {
    Known(u16),
    Pending {
        label: String,
        selector: Option<ByteSelector>,
    },
}

/// One resolve pass over the classified source.
pub struct Resolver<'a> {
    labels: &'a mut Labels,
    variables: &'a Variables,
    pc: u32,
}

impl<'a> Resolver<'a> {
    pub fn new(labels: &'a mut Labels, variables: &'a Variables, origin: u16) -> Self {
        Self {
            labels,
            variables,
            pc: origin as u32,
        }
    }

    /// Encodes every token, stopping at the first error.
    pub fn resolve(mut self, tokens: &[CodeToken]) -> Result<Vec<InstructionToken>, AssemblerError> {
        let mut encoded = Vec::new();

        for token in tokens {
            let line = token.line;
            match &token.kind {
                CodeTokenKind::Origin(value) => match self.eval(value, line)? {
                    Resolved::Known(addr) => self.pc = addr as u32,
                    Resolved::Pending { label, .. } => {
                        return Err(AssemblerError::new(
                            ErrorType::UndefinedLabel,
                            line,
                            format!("origin refers to '{}' before it is defined", label),
                        ))
                    }
                },
                CodeTokenKind::Variable(_) => {}
                CodeTokenKind::Label(name) => {
                    let pc = self.current_pc(line)?;
                    self.labels.resolve(name, pc);
                }
                CodeTokenKind::Instruction { mnemonic, operand } => {
                    let pc = self.current_pc(line)?;
                    let token = self.encode_instruction(*mnemonic, operand, pc, line)?;
                    self.advance(&token)?;
                    encoded.push(token);
                }
                CodeTokenKind::Data { directive, items } => {
                    let pc = self.current_pc(line)?;
                    let token = self.encode_data(*directive, items, pc, line)?;
                    self.advance(&token)?;
                    encoded.push(token);
                }
                CodeTokenKind::Error(err) => return Err(err.clone()),
            }
        }

        Ok(encoded)
    }

    fn current_pc(&self, line: usize) -> Result<u16, AssemblerError> {
        u16::try_from(self.pc).map_err(|_| {
            AssemblerError::new(
                ErrorType::RangeError,
                line,
                "program counter runs past $FFFF".to_string(),
            )
        })
    }

    fn advance(&mut self, token: &InstructionToken) -> Result<(), AssemblerError> {
        self.pc += token.bytes.len() as u32;
        if self.pc > 0x1_0000 {
            return Err(AssemblerError::new(
                ErrorType::RangeError,
                token.line,
                "program counter runs past $FFFF".to_string(),
            ));
        }
        Ok(())
    }

    fn eval(&self, value: &Value, line: usize) -> Result<Resolved, AssemblerError> {
        self.eval_value(value, line, &mut Vec::new())
    }

    fn eval_value(
        &self,
        value: &Value,
        line: usize,
        chain: &mut Vec<String>,
    ) -> Result<Resolved, AssemblerError> {
        let inner = self.eval_atom(&value.atom, line, chain)?;
        let Some(selector) = value.selector else {
            return Ok(inner);
        };

        Ok(match inner {
            Resolved::Known(v) => Resolved::Known(selector.apply(v)),
            Resolved::Pending {
                label,
                selector: None,
            } => Resolved::Pending {
                label,
                selector: Some(selector),
            },
            // already a single byte: `<` keeps it, `>` of a byte is zero
            pending @ Resolved::Pending { .. } => match selector {
                ByteSelector::Low => pending,
                ByteSelector::High => Resolved::Known(0),
            },
        })
    }

    fn eval_atom(
        &self,
        atom: &Atom,
        line: usize,
        chain: &mut Vec<String>,
    ) -> Result<Resolved, AssemblerError> {
        let name = match atom {
            Atom::Number(n) => return Ok(Resolved::Known(*n)),
            Atom::Symbol(name) => name,
        };

        if let Some(text) = self.variables.get(name) {
            if chain.iter().any(|seen| seen == name) {
                chain.push(name.clone());
                return Err(AssemblerError::new(
                    ErrorType::CircularVariable,
                    line,
                    format!("circular variable definition: {}", chain.join(" -> ")),
                ));
            }
            chain.push(name.clone());
            let value = parse_value(text, line)?;
            let resolved = self.eval_value(&value, line, chain)?;
            chain.pop();
            return Ok(resolved);
        }

        Ok(match self.labels.get(name) {
            Some(Some(addr)) => Resolved::Known(addr),
            // declared further down, or never: backpatch decides
            _ => Resolved::Pending {
                label: name.clone(),
                selector: None,
            },
        })
    }

    fn encode_instruction(
        &self,
        mnemonic: Mnemonic,
        operand: &OperandSyntax,
        pc: u16,
        line: usize,
    ) -> Result<InstructionToken, AssemblerError> {
        let Some(value) = operand.value() else {
            let opcode = opcode_for(mnemonic, AddressingMode::Implicit, line)?;
            return Ok(InstructionToken {
                line,
                pc,
                opcode: Some(opcode),
                bytes: vec![opcode],
                patches: Vec::new(),
            });
        };

        let resolved = self.eval(value, line)?;
        let mode = select_mode(mnemonic, operand, &resolved, line)?;
        let opcode = opcode_for(mnemonic, mode, line)?;

        let mut token = InstructionToken {
            line,
            pc,
            opcode: Some(opcode),
            bytes: vec![opcode],
            patches: Vec::new(),
        };

        match mode {
            AddressingMode::Relative => match resolved {
                Resolved::Known(target) => {
                    let offset = branch_offset(target, pc, 2, line)?;
                    token.bytes.push(offset);
                }
                Resolved::Pending { label, .. } => {
                    token.bytes.push(0);
                    token.patches.push(Patch {
                        label,
                        offset: 1,
                        kind: PatchKind::Relative,
                    });
                }
            },
            _ if mode.operand_len() == 1 => emit_byte(&mut token, resolved, line)?,
            _ => emit_word(&mut token, resolved),
        }

        Ok(token)
    }

    fn encode_data(
        &self,
        directive: DataDirective,
        items: &[DataItem],
        pc: u16,
        line: usize,
    ) -> Result<InstructionToken, AssemblerError> {
        let mut token = InstructionToken {
            line,
            pc,
            opcode: None,
            bytes: Vec::new(),
            patches: Vec::new(),
        };

        for item in items {
            match (directive, item) {
                (DataDirective::Byte, DataItem::Text(text)) => {
                    if !text.is_ascii() {
                        return Err(AssemblerError::new(
                            ErrorType::RangeError,
                            line,
                            format!("string \"{}\" contains non-ASCII characters", text),
                        ));
                    }
                    token.bytes.extend_from_slice(text.as_bytes());
                }
                (DataDirective::Byte, DataItem::Value(value)) => {
                    let resolved = self.eval(value, line)?;
                    emit_byte(&mut token, resolved, line)?;
                }
                (DataDirective::Word, DataItem::Value(value)) => {
                    let resolved = self.eval(value, line)?;
                    emit_word(&mut token, resolved);
                }
                (DataDirective::Word, DataItem::Text(_)) => {
                    return Err(AssemblerError::new(
                        ErrorType::InvalidDirective,
                        line,
                        ".WORD does not accept strings".to_string(),
                    ))
                }
            }
        }

        Ok(token)
    }
}

fn opcode_for(mnemonic: Mnemonic, mode: AddressingMode, line: usize) -> Result<u8, AssemblerError> {
    lookup(mnemonic, mode).ok_or_else(|| {
        AssemblerError::new(
            ErrorType::InvalidAddressingMode,
            line,
            format!("{} does not support {} addressing", mnemonic, mode),
        )
    })
}

/// Picks the narrowest addressing mode the operand allows.
fn select_mode(
    mnemonic: Mnemonic,
    operand: &OperandSyntax,
    resolved: &Resolved,
    line: usize,
) -> Result<AddressingMode, AssemblerError> {
    let modes = operand.candidate_modes(mnemonic.is_branch());
    let (narrow, wide) = match *modes {
        [narrow, wide] => (narrow, wide),
        [only, ..] => return Ok(only),
        [] => return Ok(AddressingMode::Implicit),
    };

    let fits_byte = match resolved {
        Resolved::Known(v) => *v <= 0xFF,
        Resolved::Pending { selector, .. } => selector.is_some(),
    };

    if fits_byte && supports(mnemonic, narrow) {
        return Ok(narrow);
    }
    if supports(mnemonic, wide) {
        return Ok(wide);
    }
    if let Resolved::Known(v) = resolved {
        if supports(mnemonic, narrow) {
            return Err(AssemblerError::new(
                ErrorType::RangeError,
                line,
                format!("{} {} operand ${:04X} does not fit in zero page", mnemonic, narrow, v),
            ));
        }
    }
    // pending without selector on a zero-page-only form; backpatch checks the size
    Ok(narrow)
}

fn branch_offset(target: u16, pc: u16, len: u16, line: usize) -> Result<u8, AssemblerError> {
    let next = pc.wrapping_add(len) as i32;
    let offset = target as i32 - next;
    if !(-128..=127).contains(&offset) {
        return Err(AssemblerError::new(
            ErrorType::RangeError,
            line,
            format!("branch to ${:04X} is out of range (offset {})", target, offset),
        ));
    }
    Ok(offset as i8 as u8)
}

fn emit_byte(token: &mut InstructionToken, resolved: Resolved, line: usize) -> Result<(), AssemblerError> {
    match resolved {
        Resolved::Known(v) => {
            let byte = u8::try_from(v).map_err(|_| {
                AssemblerError::new(
                    ErrorType::RangeError,
                    line,
                    format!("value ${:04X} does not fit in one byte", v),
                )
            })?;
            token.bytes.push(byte);
        }
        Resolved::Pending { label, selector } => {
            let kind = match selector {
                Some(ByteSelector::Low) => PatchKind::Low,
                Some(ByteSelector::High) => PatchKind::High,
                None => PatchKind::Byte,
            };
            token.patches.push(Patch {
                label,
                offset: token.bytes.len(),
                kind,
            });
            token.bytes.push(0);
        }
    }
    Ok(())
}

fn emit_word(token: &mut InstructionToken, resolved: Resolved) {
    match resolved {
        Resolved::Known(v) => token.bytes.extend_from_slice(&v.to_le_bytes()),
        Resolved::Pending { label, selector } => {
            let kind = match selector {
                Some(ByteSelector::Low) => PatchKind::Low,
                Some(ByteSelector::High) => PatchKind::High,
                None => PatchKind::Word,
            };
            token.patches.push(Patch {
                label,
                offset: token.bytes.len(),
                kind,
            });
            token.bytes.extend_from_slice(&[0, 0]);
        }
    }
}

/// Fills every pending reference from the completed label table.
pub fn backpatch(tokens: &mut [InstructionToken], labels: &Labels) -> Result<(), AssemblerError> {
    for token in tokens.iter_mut() {
        for patch in std::mem::take(&mut token.patches) {
            let Some(Some(address)) = labels.get(&patch.label) else {
                return Err(AssemblerError::new(
                    ErrorType::UndefinedLabel,
                    token.line,
                    format!("undefined label '{}'", patch.label),
                ));
            };

            match patch.kind {
                PatchKind::Relative => {
                    let len = token.bytes.len() as u16;
                    token.bytes[patch.offset] = branch_offset(address, token.pc, len, token.line)?;
                }
                PatchKind::Byte => {
                    token.bytes[patch.offset] = u8::try_from(address).map_err(|_| {
                        AssemblerError::new(
                            ErrorType::RangeError,
                            token.line,
                            format!("label '{}' (${:04X}) does not fit in one byte", patch.label, address),
                        )
                    })?;
                }
                PatchKind::Low => token.bytes[patch.offset] = address as u8,
                PatchKind::High => token.bytes[patch.offset] = (address >> 8) as u8,
                PatchKind::Word => {
                    let [lo, hi] = address.to_le_bytes();
                    token.bytes[patch.offset] = lo;
                    token.bytes[patch.offset + 1] = hi;
                }
            }
        }
    }
    Ok(())
}
