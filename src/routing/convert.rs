//! Segment-to-parameter conversion.
//!
//! # Responsibilities
//! - Hold the fallible parsers known to a router, keyed by target type
//! - Pick the conversion for an indexed accessor's parameter once, at build time
//!
//! # Design Decisions
//! - Fallible parser first: a failed parse is a routing miss
//! - Generic `FromStr` second: a failed conversion is a `RouteError::Conversion`
//! - The registry is frozen once the router is built

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use uuid::Uuid;

use crate::routing::error::{RouteError, RouteResult};

/// Fallible parser signature stored in the registry.
pub type TryParseFn<P> = fn(&str) -> Option<P>;

/// Which conversion an indexed invoker was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    TryParse,
    Generic,
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionKind::TryParse => f.write_str("try-parse"),
            ConversionKind::Generic => f.write_str("generic"),
        }
    }
}

/// Conversion bound to one parameter type.
pub enum Converter<P> {
    TryParse(TryParseFn<P>),
    Generic,
}

impl<P> Clone for Converter<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Converter<P> {}

impl<P> fmt::Debug for Converter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Converter").field(&self.kind()).finish()
    }
}

impl<P> Converter<P> {
    pub fn kind(&self) -> ConversionKind {
        match self {
            Converter::TryParse(_) => ConversionKind::TryParse,
            Converter::Generic => ConversionKind::Generic,
        }
    }
}

impl<P> Converter<P>
where
    P: FromStr,
    P::Err: fmt::Display,
{
    /// Convert a raw segment.
    ///
    /// `Ok(None)` is a routing miss; `Err` is a conversion fault.
    pub fn convert(&self, segment: &str) -> RouteResult<Option<P>> {
        match self {
            Converter::TryParse(parse) => Ok(parse(segment)),
            Converter::Generic => segment
                .parse::<P>()
                .map(Some)
                .map_err(|e| RouteError::Conversion {
                    segment: segment.to_string(),
                    target: std::any::type_name::<P>(),
                    reason: e.to_string(),
                }),
        }
    }
}

/// Fallible parsers keyed by target type.
pub struct ConverterRegistry {
    parsers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ConverterRegistry {
    /// A registry without any parser: every parameter uses generic conversion.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// A registry with parsers for primitives, `String`, `Uuid` and IP addresses.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();

        macro_rules! from_str_parsers {
            ($($ty:ty),* $(,)?) => {
                $( registry.register::<$ty>(|s| s.parse().ok()); )*
            };
        }

        from_str_parsers!(
            u8, u16, u32, u64, u128, usize,
            i8, i16, i32, i64, i128, isize,
            f32, f64, bool, char,
            IpAddr, Ipv4Addr, Ipv6Addr,
        );
        registry.register::<String>(|s| Some(s.to_owned()));
        registry.register::<Uuid>(|s| Uuid::parse_str(s).ok());
        registry
    }

    /// Register or replace the fallible parser for `P`.
    pub fn register<P: 'static>(&mut self, parse: TryParseFn<P>) {
        self.parsers.insert(TypeId::of::<P>(), Box::new(parse));
    }

    /// The fallible parser for `P`, if one is registered.
    pub fn try_parser<P: 'static>(&self) -> Option<TryParseFn<P>> {
        self.parsers
            .get(&TypeId::of::<P>())
            .and_then(|parse| parse.downcast_ref::<TryParseFn<P>>())
            .copied()
    }

    /// Resolve the conversion for `P`: fallible parser if known, generic otherwise.
    pub fn converter<P: 'static>(&self) -> Converter<P> {
        match self.try_parser::<P>() {
            Some(parse) => Converter::TryParse(parse),
            None => Converter::Generic,
        }
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("parsers", &self.parsers.len())
            .finish()
    }
}
