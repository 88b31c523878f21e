// src/type_ref/text.rs
//
// Compact text encoding of type refs.
//
//   type_ref := NAME type_args? value_args?
//   type_args := '<' (type_ref (',' type_ref)*)? '>'
//   value_args := '[' (value (',' value)*)? ']'
//   value := INT | INT '/' INT | STRING | '@' STRING | '#' NAME | '(' value,* ')'
//
// A bare NAME is a primitive type. A constructed ref without arguments is
// written `NAME<>`.

use std::fmt;
use std::path::PathBuf;

use smallvec::SmallVec;
use weft_identity::Identifier;

use super::{RegisteredTypeId, TypeConstructorArguments, TypeConstructorId, TypeRef};
use crate::errors::TypeSystemError;
use crate::value::{Rational, TupleValue, Value, ValueHolder};

pub(super) fn write_type_ref(f: &mut fmt::Formatter<'_>, type_ref: &TypeRef) -> fmt::Result {
    match type_ref {
        TypeRef::Primitive(id) => write!(f, "{id}"),
        TypeRef::Constructed(id, args) => {
            write!(f, "{id}")?;
            if !args.type_args.is_empty() || args.value_args.is_empty() {
                f.write_str("<")?;
                for (i, arg) in args.type_args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_type_ref(f, arg)?;
                }
                f.write_str(">")?;
            }
            if !args.value_args.is_empty() {
                f.write_str("[")?;
                for (i, arg) in args.value_args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", **arg)?;
                }
                f.write_str("]")?;
            }
            Ok(())
        }
    }
}

pub(super) fn parse_type_ref(text: &str, max_depth: usize) -> Result<TypeRef, TypeSystemError> {
    let mut parser = Parser {
        text,
        pos: 0,
        max_depth,
    };
    let type_ref = parser.type_ref(1)?;
    parser.skip_ws();
    if parser.pos < text.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(type_ref)
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    max_depth: usize,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> TypeSystemError {
        TypeSystemError::Parse {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek()
            && ch.is_whitespace()
        {
            self.pos += ch.len_utf8();
        }
    }

    /// Consume `expected` (after whitespace) if it is next.
    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeSystemError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{expected}'")))
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), TypeSystemError> {
        if depth > self.max_depth {
            return Err(self.error(format!("nesting deeper than {}", self.max_depth)));
        }
        Ok(())
    }

    fn identifier(&mut self) -> Result<Identifier, TypeSystemError> {
        self.skip_ws();
        let start = self.pos;
        let rest = &self.text[start..];
        let mut len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if rest[len..].starts_with('\'') {
            let digits = rest[len + 1..]
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len() - len - 1);
            len += 1 + digits;
        }
        if len == 0 {
            return Err(self.error("expected an identifier"));
        }
        let id = rest[..len]
            .parse::<Identifier>()
            .map_err(|err| self.error(err.to_string()))?;
        self.pos += len;
        Ok(id)
    }

    fn type_ref(&mut self, depth: usize) -> Result<TypeRef, TypeSystemError> {
        self.check_depth(depth)?;
        let name = self.identifier()?;
        let mut args = TypeConstructorArguments::default();
        let mut constructed = false;

        if self.eat('<') {
            constructed = true;
            if !self.eat('>') {
                loop {
                    args.type_args.push(self.type_ref(depth + 1)?);
                    if self.eat('>') {
                        break;
                    }
                    self.expect(',')?;
                }
            }
        }
        if self.eat('[') {
            constructed = true;
            args.value_args = self.value_list(']', depth)?;
        }

        if constructed {
            Ok(TypeRef::Constructed(
                TypeConstructorId(name),
                std::sync::Arc::new(args),
            ))
        } else {
            Ok(TypeRef::Primitive(RegisteredTypeId(name)))
        }
    }

    fn value_list(
        &mut self,
        close: char,
        depth: usize,
    ) -> Result<SmallVec<[ValueHolder; 2]>, TypeSystemError> {
        let mut values = SmallVec::new();
        if self.eat(close) {
            return Ok(values);
        }
        loop {
            values.push(ValueHolder::new(self.value(depth + 1)?));
            if self.eat(close) {
                return Ok(values);
            }
            self.expect(',')?;
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value, TypeSystemError> {
        self.check_depth(depth)?;
        self.skip_ws();
        match self.peek() {
            Some('#') => {
                self.pos += 1;
                Ok(Value::Enum(self.identifier()?))
            }
            Some('"') => Ok(Value::String(self.string()?)),
            Some('@') => {
                self.pos += 1;
                Ok(Value::FilePath(PathBuf::from(self.string()?)))
            }
            Some('(') => {
                self.pos += 1;
                let elements = self.value_list(')', depth)?;
                Ok(Value::Tuple(TupleValue(elements.into_vec())))
            }
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.number(),
            _ => Err(self.error("expected a value")),
        }
    }

    fn integer(&mut self) -> Result<i64, TypeSystemError> {
        self.skip_ws();
        let start = self.pos;
        let rest = &self.text[start..];
        let sign = usize::from(rest.starts_with('-'));
        let digits = rest[sign..]
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len() - sign);
        if digits == 0 {
            return Err(self.error("expected digits"));
        }
        let value = rest[..sign + digits]
            .parse()
            .map_err(|_| self.error("integer out of range"))?;
        self.pos += sign + digits;
        Ok(value)
    }

    fn number(&mut self) -> Result<Value, TypeSystemError> {
        let num = self.integer()?;
        if !self.eat('/') {
            return Ok(Value::Int(num));
        }
        let den = self.integer()?;
        Rational::new(num, den)
            .map(Value::Rational)
            .ok_or_else(|| self.error(format!("invalid rational {num}/{den}")))
    }

    fn string(&mut self) -> Result<String, TypeSystemError> {
        self.expect('"')?;
        let mut out = String::new();
        let mut chars = self.text[self.pos..].char_indices();
        while let Some((i, ch)) = chars.next() {
            match ch {
                '"' => {
                    self.pos += i + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, escaped @ ('"' | '\\'))) => out.push(escaped),
                    _ => {
                        self.pos += i;
                        return Err(self.error("invalid escape"));
                    }
                },
                _ => out.push(ch),
            }
        }
        self.pos = self.text.len();
        Err(self.error("unterminated string"))
    }
}
