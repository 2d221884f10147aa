macro_rules! range_check {
    ($n:expr, 0, $upper:expr) => {{
        if $n > $upper {
            ::std::result::Result::Err(::std::io::Error::new(
                ::std::io::ErrorKind::InvalidData,
                format!("{} is out of range [0, {}]: {}", stringify!($n), $upper, $n),
            ))
        } else {
            ::std::result::Result::Ok(())
        }
    }};
    ($n:expr, $lower:expr, $upper:expr) => {{
        if $n < $lower || $n > $upper {
            ::std::result::Result::Err(::std::io::Error::new(
                ::std::io::ErrorKind::InvalidData,
                format!("{} is out of range [{}, {}]: {}", stringify!($n), $lower, $upper, $n),
            ))
        } else {
            ::std::result::Result::Ok(())
        }
    }};
}

pub(crate) use range_check;

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    #[test]
    fn bounds() {
        let id = 15u8;
        range_check!(id, 0, 15).unwrap();

        let id = 16u8;
        range_check!(id, 0, 15).unwrap_err();

        let width = 0u16;
        range_check!(width, 1, 16888).unwrap_err();
    }
}
