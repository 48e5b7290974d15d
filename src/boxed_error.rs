/// Define an error type `$wrappername` holding a
/// `Box<$kindname>`, with `$kindname` derived via `thiserror`. The
/// wrapper keeps `Result<T, $wrappername>` one pointer wide, derefs
/// to the kind for matching, and converts from anything the kind
/// converts from, so `#[from]` and `?` keep working.
#[macro_export]
macro_rules! def_boxed_thiserror {
    ($wrappername:ident, $vis:vis enum $kindname:ident { $($body:tt)* }) => {
        #[derive(thiserror::Error, Debug)]
        $vis enum $kindname {
            $($body)*
        }

        #[derive(Debug)]
        $vis struct $wrappername(Box<$kindname>);

        impl std::ops::Deref for $wrappername {
            type Target = $kindname;

            fn deref(&self) -> &Self::Target {
                &*self.0
            }
        }

        impl<E> From<E> for $wrappername where $kindname: From<E> {
            fn from(err: E) -> Self {
                $wrappername(Box::new($kindname::from(err)))
            }
        }

        impl std::error::Error for $wrappername {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                std::error::Error::source(&*self.0)
            }
        }

        impl std::fmt::Display for $wrappername {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                // Not self.0.fmt(f): ambiguous with Debug
                std::fmt::Display::fmt(&*self.0, f)
            }
        }
    }
}
