//! Feature definition macro.
//!
//! [`define_feature!`] turns one declarative operation list into every
//! per-feature piece of the envelope contract:
//!
//! * the feature marker type and its [`Feature`](crate::Feature) impl,
//! * the Driver trait the channel implements,
//! * the envelope-side view driver proxying each operation over the bus,
//! * the channel API table serving each operation from a Driver,
//! * `METHODS`, the wire name of every operation.
//!
//! ```ignore
//! define_feature! {
//!     /// Greeting feature.
//!     pub struct Greeter = "greeter";
//!     init = String;
//!     driver = GreeterDriver;
//!     view_driver = GreeterViewDriver;
//!     channel_api = GreeterChannelApi;
//!     methods {
//!         /// Greets `name`.
//!         fn greet = "greet" (name: String) -> String;
//!     }
//! }
//! ```

/// Defines a feature, its Driver trait, view driver, and channel API table.
///
/// See the [module documentation](crate::macros) for the generated items.
#[macro_export]
macro_rules! define_feature {
	(
		$(#[$fmeta:meta])*
		$vis:vis struct $feature:ident = $name:literal;
		init = $init:ty;
		driver = $driver:ident;
		view_driver = $view_driver:ident;
		channel_api = $channel_api:ident;
		methods {
			$(
				$(#[$mmeta:meta])*
				fn $op:ident = $wire:literal ( $( $arg:ident : $argty:ty ),* $(,)? ) -> $ret:ty;
			)+
		}
	) => {
		$(#[$fmeta])*
		#[derive(Debug, Clone, Copy, Default)]
		$vis struct $feature;

		impl $crate::Feature for $feature {
			const NAME: &'static str = $name;
			type InitArgs = $init;
		}

		impl $feature {
			/// Wire names of every channel API operation, in declaration order.
			pub const METHODS: &'static [&'static str] = &[$(concat!($name, "__", $wire)),+];
		}

		#[doc = concat!("Data operations the `", $name, "` view needs, implemented by the channel.")]
		#[$crate::__private::async_trait]
		$vis trait $driver: Send + Sync {
			$(
				$(#[$mmeta])*
				async fn $op(&self $(, $arg: $argty)*) -> $crate::__private::Result<$ret>;
			)+
		}

		#[doc = concat!("Envelope-side [`", stringify!($driver), "`] sending each call to the channel.")]
		#[derive(Clone)]
		$vis struct $view_driver {
			sender: $crate::__private::Arc<dyn $crate::RequestSender>,
		}

		impl $view_driver {
			/// Proxies every operation through `sender`.
			pub fn new(sender: impl $crate::RequestSender + 'static) -> Self {
				Self {
					sender: $crate::__private::Arc::new(sender),
				}
			}
		}

		impl ::std::fmt::Debug for $view_driver {
			fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
				f.debug_struct(stringify!($view_driver)).finish_non_exhaustive()
			}
		}

		#[$crate::__private::async_trait]
		impl $driver for $view_driver {
			$(
				async fn $op(&self $(, $arg: $argty)*) -> $crate::__private::Result<$ret> {
					let args: ::std::vec::Vec<$crate::__private::JsonValue> =
						::std::vec![$($crate::__private::to_arg(&$arg)?),*];
					let value = self.sender.request(concat!($name, "__", $wire), args).await?;
					Ok($crate::__private::serde_json::from_value(value)?)
				}
			)+
		}

		#[doc = concat!("Channel API table of `", $name, "`.")]
		#[derive(Debug, Clone, Copy, Default)]
		$vis struct $channel_api;

		impl $channel_api {
			/// Serves every operation from `driver`, decoding positional arguments 1:1.
			pub fn register(
				router: &mut $crate::__private::Router,
				driver: $crate::__private::Arc<dyn $driver>,
			) {
				$(
					{
						let driver = $crate::__private::Arc::clone(&driver);
						router.request(concat!($name, "__", $wire), move |args| {
							let driver = $crate::__private::Arc::clone(&driver);
							async move {
								#[allow(unused_mut, unused_variables)]
								let mut args = args;
								$( let $arg: $argty = args.next()?; )*
								$crate::__private::reply(driver.$op($($arg),*).await)
							}
						});
					}
				)+
			}
		}
	};
}
