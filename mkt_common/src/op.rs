/// Forwards operator traits on a single-field newtype to the wrapped value.
///
/// ```ignore
/// op!(Cents: Add::add, Sub::sub);
/// op!(Cents: assign AddAssign::add_assign);
/// op!(Cents: unary Neg::neg);
/// ```
#[macro_export]
macro_rules! op {
    ($newtype:ident: assign $($op:ident::$method:ident),+) => {
        $(impl $op for $newtype {
            fn $method(&mut self, rhs: Self) {
                self.0.$method(rhs.0)
            }
        })+
    };

    ($newtype:ident: unary $($op:ident::$method:ident),+) => {
        $(impl $op for $newtype {
            type Output = Self;
            fn $method(self) -> Self {
                Self(self.0.$method())
            }
        })+
    };

    ($newtype:ident: $($op:ident::$method:ident),+) => {
        $(impl $op for $newtype {
            type Output = Self;
            fn $method(self, rhs: Self) -> Self {
                Self(self.0.$method(rhs.0))
            }
        })+
    };
}
