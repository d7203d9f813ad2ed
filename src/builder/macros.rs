//! Macros for declaring states, events, and the synthesized call surface.

/// Generate a state enum together with its `State` implementation.
///
/// # Example
///
/// ```
/// use statecraft::state_enum;
///
/// state_enum! {
///     pub enum UploadState {
///         Pending,
///         Uploading,
///         Completed,
///     }
/// }
///
/// use statecraft::core::State;
/// assert_eq!(UploadState::Uploading.name(), "Uploading");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

/// Generate an event enum together with its `Event` implementation.
///
/// Variants may carry named payload fields; the generated `name` ignores
/// them, so every payload of a variant dispatches the same transitions.
///
/// # Example
///
/// ```
/// use statecraft::event_enum;
///
/// event_enum! {
///     pub enum UploadEvent {
///         Start,
///         Finish { url: String },
///     }
/// }
///
/// use statecraft::core::Event;
/// let event = UploadEvent::Finish { url: "https://x".into() };
/// assert_eq!(event.name(), "Finish");
/// ```
#[macro_export]
macro_rules! event_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant $( { $($field : $ty),* } )?
            ),*
        }

        impl $crate::core::Event for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant $( { $($field: _),* } )? => stringify!($variant)),*
                }
            }
        }
    };
}

/// Generate a wrapper struct exposing one method per declared event and
/// one predicate per declared state, delegating to `send`, `can`, and
/// `is` on the wrapped machine.
///
/// Event payload fields become method arguments. The wrapper derefs to
/// the machine, so the whole runtime API stays reachable.
///
/// # Example
///
/// ```
/// use statecraft::{event_enum, machine_surface, state_enum, MachineBuilder, TransitionBuilder};
///
/// state_enum! {
///     pub enum LightState { Red, Green }
/// }
///
/// event_enum! {
///     pub enum LightEvent { Advance }
/// }
///
/// machine_surface! {
///     pub struct TrafficLight for Machine<LightState, LightEvent, ()> {
///         events {
///             advance / can_advance => Advance,
///         }
///         states {
///             is_red => Red,
///             is_green => Green,
///         }
///     }
/// }
///
/// let machine = MachineBuilder::new()
///     .initial(LightState::Red)
///     .context(())
///     .transition(
///         TransitionBuilder::new()
///             .from(LightState::Red)
///             .on("Advance")
///             .to(LightState::Green),
///     )
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let light = TrafficLight::new(machine);
/// assert!(light.is_red());
/// assert!(!light.is_green());
/// ```
#[macro_export]
macro_rules! machine_surface {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident for Machine<$S:ident, $E:ident, $C:ty> {
            events {
                $( $method:ident / $can_method:ident => $ev:ident $( ( $($arg:ident : $aty:ty),* $(,)? ) )? ),* $(,)?
            }
            states {
                $( $is_method:ident => $st:ident ),* $(,)?
            }
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            inner: $crate::machine::Machine<$S, $E, $C>,
        }

        impl $name {
            $vis fn new(inner: $crate::machine::Machine<$S, $E, $C>) -> Self {
                Self { inner }
            }

            $vis fn into_inner(self) -> $crate::machine::Machine<$S, $E, $C> {
                self.inner
            }

            $(
                $vis async fn $method(
                    &mut self $(, $($arg : $aty),* )?
                ) -> Result<$S, $crate::machine::MachineError> {
                    self.inner.send($E::$ev $( { $($arg),* } )?).await
                }

                $vis async fn $can_method(
                    &self $(, $($arg : $aty),* )?
                ) -> Result<bool, $crate::machine::MachineError> {
                    self.inner.can(&$E::$ev $( { $($arg),* } )?).await
                }
            )*

            $(
                $vis fn $is_method(&self) -> bool {
                    self.inner.is(&$S::$st)
                }
            )*
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::machine::Machine<$S, $E, $C>;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.inner
            }
        }
    };
}
