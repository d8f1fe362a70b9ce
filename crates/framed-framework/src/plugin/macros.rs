// ─── define_plugin! ──────────────────────────────────────────────────────────

/// Creates a [`PluginDescriptor`].
///
/// # Syntax
///
/// ```rust,ignore
/// use framed::prelude::*;
///
/// pub static INFO: PluginDescriptor = define_plugin! {
///     id: "default.bot.info",
///     name: "Info",
///     register: register,
///
///     // Optional
///     version: "2.0.0",
///     description: "Info commands.",
///     group: "Info",
///     group_emote: "🔎",
/// };
///
/// fn register(r: &mut PluginRegistrar) {
///     r.command(CommandBuilder::new("ping").handler(ping));
/// }
/// ```
///
/// ## Field reference
///
/// | Field | Required | Description |
/// |-------|----------|-------------|
/// | `id` | ✓ | Must be **first**. Plugin id and config-section key. |
/// | `name` | ✓ | Must be **second**. Display name. |
/// | `register` | ✓ | `fn(&mut PluginRegistrar)` |
/// | `version` | — | Defaults to the crate's `CARGO_PKG_VERSION`. |
/// | `description` | — | Short description. |
/// | `group` | — | Help group for commands without one. |
/// | `group_emote` | — | Emote shown next to the group. |
///
/// [`PluginDescriptor`]: crate::plugin::PluginDescriptor
#[macro_export]
macro_rules! define_plugin {
    // ── Entry ─────────────────────────────────────────────────────────────────
    //
    // Accumulator slots: [id] [name] [version?] [description?] [group?]
    // [group_emote?] [register?]
    (id: $id:literal, name: $name:literal $(, $($tail:tt)*)?) => {
        $crate::define_plugin!(
            @acc [$id] [$name] [] [] [] [] []
            $($($tail)*)?
        )
    };

    // ── Skip stray commas ─────────────────────────────────────────────────────
    (@acc $id:tt $n:tt $v:tt $d:tt $g:tt $e:tt $r:tt , $($rest:tt)*) => {
        $crate::define_plugin!(@acc $id $n $v $d $g $e $r $($rest)*)
    };

    // ── Optional literals ─────────────────────────────────────────────────────
    (@acc $id:tt $n:tt [] $d:tt $g:tt $e:tt $r:tt version: $val:literal $($rest:tt)*) => {
        $crate::define_plugin!(@acc $id $n [$val] $d $g $e $r $($rest)*)
    };
    (@acc $id:tt $n:tt $v:tt [] $g:tt $e:tt $r:tt description: $val:literal $($rest:tt)*) => {
        $crate::define_plugin!(@acc $id $n $v [$val] $g $e $r $($rest)*)
    };
    (@acc $id:tt $n:tt $v:tt $d:tt [] $e:tt $r:tt group: $val:literal $($rest:tt)*) => {
        $crate::define_plugin!(@acc $id $n $v $d [$val] $e $r $($rest)*)
    };
    (@acc $id:tt $n:tt $v:tt $d:tt $g:tt [] $r:tt group_emote: $val:literal $($rest:tt)*) => {
        $crate::define_plugin!(@acc $id $n $v $d $g [$val] $r $($rest)*)
    };

    // ── register: path , <more fields> ────────────────────────────────────────
    (@acc $id:tt $n:tt $v:tt $d:tt $g:tt $e:tt [] register: $reg:path , $($rest:tt)*) => {
        $crate::define_plugin!(@acc $id $n $v $d $g $e [$reg] $($rest)*)
    };

    // ── register: path (last field) ───────────────────────────────────────────
    (@acc $id:tt $n:tt $v:tt $d:tt $g:tt $e:tt [] register: $reg:path) => {
        $crate::define_plugin!(@acc $id $n $v $d $g $e [$reg])
    };

    // ── No remaining fields → emit ────────────────────────────────────────────
    (@acc [$id:literal] [$n:literal] [$($v:expr)?] [$($d:expr)?] [$($g:expr)?] [$($e:expr)?] [$reg:path]) => {
        $crate::plugin::PluginDescriptor {
            api_version: $crate::plugin::FRAMED_PLUGIN_API_VERSION,
            id: $id,
            name: $n,
            version: $crate::define_plugin!(@or [$($v)?] ::std::env!("CARGO_PKG_VERSION")),
            description: $crate::define_plugin!(@opt [$($d)?]),
            group: $crate::define_plugin!(@opt [$($g)?]),
            group_emote: $crate::define_plugin!(@opt [$($e)?]),
            register: $reg,
        }
    };

    (@or [] $default:expr) => { $default };
    (@or [$val:expr] $default:expr) => { $val };
    (@opt []) => { ::std::option::Option::None };
    (@opt [$val:expr]) => { ::std::option::Option::Some($val) };
}

// ─── submit_plugin! ──────────────────────────────────────────────────────────

/// Adds a `static` [`PluginDescriptor`] to the build-time
/// [`PLUGIN_MANIFEST`].
///
/// ```rust,ignore
/// pub static INFO: PluginDescriptor = define_plugin! { /* … */ };
/// submit_plugin!(INFO);
/// ```
///
/// [`PluginDescriptor`]: crate::plugin::PluginDescriptor
/// [`PLUGIN_MANIFEST`]: crate::plugin::PLUGIN_MANIFEST
#[macro_export]
macro_rules! submit_plugin {
    ($plugin:path) => {
        const _: () = {
            #[$crate::__private::linkme::distributed_slice($crate::plugin::PLUGIN_MANIFEST)]
            #[linkme(crate = $crate::__private::linkme)]
            static __FRAMED_MANIFEST_ENTRY: &'static $crate::plugin::PluginDescriptor = &$plugin;
        };
    };
}
