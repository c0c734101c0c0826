/// Looks up an optional flag (the common shape of flags parsed from `.aff` options) in a
/// flagset. An unset flag is never contained.
macro_rules! has_flag {
    ( $flags:expr, $flag:expr ) => {{
        match $flag {
            Some(flag) => $flags.contains(&flag),
            None => false,
        }
    }};
}
pub(crate) use has_flag;

#[cfg(test)]
macro_rules! flag {
    ( $x:expr ) => {{
        crate::Flag::new($x as u16).unwrap()
    }};
}
#[cfg(test)]
pub(crate) use flag;

#[cfg(test)]
macro_rules! flagset {
    ( $( $x:expr ),* ) => {{
        crate::FlagSet::from_iter([ $( crate::macros::flag!( $x ) ),* ])
    }};
}
#[cfg(test)]
pub(crate) use flagset;
