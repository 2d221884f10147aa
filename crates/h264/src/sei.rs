use crate::NALUnitType;

/// Number of bytes in the UUID field of a user-data-unregistered SEI
/// message.
pub const UUID_SIZE: usize = 16;

/// The `payload_type` code of a user-data-unregistered SEI message.
const USER_DATA_UNREGISTERED: u8 = 5;

/// Extracts the first unregistered user data payload whose UUID matches
/// `uuid` from an H.264 elementary stream fragment.
///
/// The buffer is scanned linearly for SEI NAL units (`00 00 01 06`). For
/// each message the payload type and the 0xFF-extended payload size are
/// decoded, and the 16 byte UUID field is compared against the caller's
/// string. Messages with a different UUID, or a payload type other than
/// user-data-unregistered, are skipped over by their declared size and the
/// scan continues.
///
/// On a match the payload (declared size minus the UUID field) is returned
/// as an owned copy with the `00 00 03` emulation prevention bytes removed.
/// Returns `None` when no matching message exists in the buffer.
///
/// The UUID comparison follows the C string semantics of the stream field:
/// a candidate's field must hold exactly 15 characters before a NUL
/// terminator, and only those 15 are compared against the start of `uuid`.
pub fn extract_sei_payload(data: &[u8], uuid: &str) -> Option<Vec<u8>> {
    let uuid = uuid.as_bytes();
    let start_code = [0x00, 0x00, 0x01, NALUnitType::Sei.0];
    let mut pos = 0;

    while pos + start_code.len() <= data.len() {
        if data[pos..pos + start_code.len()] != start_code {
            pos += 1;
            continue;
        }

        let mut cursor = pos + start_code.len();

        let payload_type = *data.get(cursor)?;
        cursor += 1;

        let mut payload_size = 0usize;
        loop {
            let byte = *data.get(cursor)?;
            cursor += 1;
            payload_size += byte as usize;
            if byte != 0xFF {
                break;
            }
        }

        let field = data.get(cursor..cursor + UUID_SIZE)?;
        if payload_type == USER_DATA_UNREGISTERED
            && uuid_matches(field, uuid)
            && payload_size >= UUID_SIZE
        {
            return copy_payload(data, cursor + UUID_SIZE, payload_size - UUID_SIZE);
        }

        tracing::trace!(payload_type, payload_size, "skipping sei message");
        pos = cursor + payload_size;
    }

    None
}

/// Compares the stream's UUID field against the caller's string.
///
/// The field is read as a NUL terminated string and is a candidate only when
/// that string is exactly [`UUID_SIZE`]` - 1` characters long; the
/// comparison then covers those 15 bytes.
fn uuid_matches(field: &[u8], uuid: &[u8]) -> bool {
    let len = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    if len != UUID_SIZE - 1 || uuid.len() < UUID_SIZE - 1 {
        return false;
    }

    field[..UUID_SIZE - 1] == uuid[..UUID_SIZE - 1]
}

/// Copies `want` payload bytes starting at `from`, dropping each `03` that
/// directly follows two zero bytes. Returns `None` when the buffer ends
/// before the declared payload does.
fn copy_payload(data: &[u8], from: usize, want: usize) -> Option<Vec<u8>> {
    let mut payload = Vec::with_capacity(want);
    let mut at = from;

    while payload.len() < want {
        let byte = *data.get(at)?;

        if byte == 0x03 && at >= 2 && data[at - 1] == 0x00 && data[at - 2] == 0x00 {
            at += 1;
            continue;
        }

        payload.push(byte);
        at += 1;
    }

    Some(payload)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use crate::sei::extract_sei_payload;

    const UUID: &str = "abcdefghijklmnoZ";
    const UUID_FIELD: [u8; 16] = *b"abcdefghijklmno\0";

    /// Builds one SEI NAL unit. `declared` is the payload size written to
    /// the stream (UUID field plus decoded payload bytes).
    fn sei_unit(payload_type: u8, uuid_field: &[u8; 16], raw_payload: &[u8], declared: usize) -> Vec<u8> {
        let mut unit = vec![0x00, 0x00, 0x01, 0x06, payload_type];

        let mut size = declared;
        while size >= 0xFF {
            unit.push(0xFF);
            size -= 0xFF;
        }
        unit.push(size as u8);

        unit.extend_from_slice(uuid_field);
        unit.extend_from_slice(raw_payload);
        unit.push(0x80); // rbsp trailing bits
        unit
    }

    #[test]
    fn extracts_matching_payload_and_strips_emulation_bytes() {
        // 00 00 03 in the raw payload decodes to 00 00.
        let raw = [0xDE, 0xAD, 0x00, 0x00, 0x03, 0x01, 0xBE];
        let data = sei_unit(5, &UUID_FIELD, &raw, 16 + 6);

        let payload = extract_sei_payload(&data, UUID).unwrap();
        assert_eq!(payload, [0xDE, 0xAD, 0x00, 0x00, 0x01, 0xBE]);
    }

    #[test]
    fn size_extension_bytes_are_summed() {
        let raw = vec![0x55u8; 0xFF];
        let data = sei_unit(5, &UUID_FIELD, &raw, 16 + 0xFF);

        let payload = extract_sei_payload(&data, UUID).unwrap();
        assert_eq!(payload.len(), 0xFF);
        assert!(payload.iter().all(|&b| b == 0x55));
    }

    #[test]
    fn non_matching_uuid_is_skipped() {
        let other_field = *b"0123456789abcde\0";
        let mut data = sei_unit(5, &other_field, &[0x11, 0x22], 16 + 2);
        data.extend_from_slice(&sei_unit(5, &UUID_FIELD, &[0x33, 0x44], 16 + 2));

        let payload = extract_sei_payload(&data, UUID).unwrap();
        assert_eq!(payload, [0x33, 0x44]);
    }

    #[test]
    fn uuid_field_without_terminator_never_matches() {
        // All sixteen bytes in use: the field is not a 15 character string.
        let field = *b"abcdefghijklmnoZ";
        let data = sei_unit(5, &field, &[0x11, 0x22], 16 + 2);

        assert_eq!(extract_sei_payload(&data, UUID), None);
    }

    #[test]
    fn other_payload_types_are_skipped() {
        let data = sei_unit(4, &UUID_FIELD, &[0x11, 0x22], 16 + 2);
        assert_eq!(extract_sei_payload(&data, UUID), None);
    }

    #[test]
    fn no_sei_unit_in_buffer() {
        assert_eq!(extract_sei_payload(&[0x00, 0x00, 0x01, 0x65, 0xAA], UUID), None);
        assert_eq!(extract_sei_payload(&[], UUID), None);
    }

    #[test]
    fn truncated_declared_size_does_not_read_out_of_bounds() {
        // Declared payload extends past the end of the buffer.
        let data = sei_unit(5, &UUID_FIELD, &[0x11], 16 + 64);
        assert_eq!(extract_sei_payload(&data, UUID), None);
    }
}
