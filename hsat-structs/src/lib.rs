pub mod config;
pub mod core;

/// Declares a serde record with public fields. `Option` fields default to
/// `None` when absent and get a getter returning `Option<&T>`.
#[macro_export]
macro_rules! serializable_struct_with_getters {
    ( @ [$($meta:tt)*] $name:ident { } -> ($($fields:tt)*) ($($getters:tt)*) ) => (
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
        $($meta)*
        pub struct $name {
            $($fields)*
        }
        impl $name {
            $($getters)*
        }
    );
    ( @ [$($meta:tt)*] $name:ident { $(#[$attr:meta])* $param:ident : Option<$type:ty>, $($rest:tt)* } -> ($($fields:tt)*) ($($getters:tt)*) ) => (
        serializable_struct_with_getters!(@ [$($meta)*] $name { $($rest)* } -> (
            $($fields)*
            $(#[$attr])*
            #[serde(default)]
            pub $param : Option<$type>,
        ) (
            $($getters)*
            pub fn $param(&self) -> Option<&$type> {
                self.$param.as_ref()
            }
        ));
    );
    ( @ [$($meta:tt)*] $name:ident { $(#[$attr:meta])* $param:ident : $type:ty, $($rest:tt)* } -> ($($fields:tt)*) ($($getters:tt)*) ) => (
        serializable_struct_with_getters!(@ [$($meta)*] $name { $($rest)* } -> (
            $($fields)*
            $(#[$attr])*
            pub $param : $type,
        ) (
            $($getters)*
        ));
    );
    ( $(#[$meta:meta])* $name:ident { $( $rest:tt)* } ) => {
        serializable_struct_with_getters!(@ [$(#[$meta])*] $name { $($rest)* } -> () ());
    };
}
