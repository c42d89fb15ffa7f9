use std::sync::Arc;

/// Constant value written directly into an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Arc<str>),
}

macro_rules! impl_from_for_literal {
    ($variant:ident, $($t:ty),*) => {
        $(
            impl From<$t> for Literal {
                fn from(v: $t) -> Self {
                    Literal::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_literal!(Integer, i8, i16, i32, i64, u8, u16, u32);
impl_from_for_literal!(Float, f32, f64);

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Boolean(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(Arc::from(v))
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(Arc::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_the_widest_variant() {
        assert_eq!(Literal::from(7u8), Literal::Integer(7));
        assert_eq!(Literal::from(1.5f32), Literal::Float(1.5));
        assert_eq!(Literal::from("x"), Literal::String(Arc::from("x")));
        assert_eq!(Literal::from(true), Literal::Boolean(true));
    }
}
