//! Audio format handling: descriptor parsing, extension choice, and
//! RIFF/WAVE container wrapping.
//!
//! The synthesis stream announces its encoding as a MIME-style descriptor
//! like `audio/L16;rate=24000`. Raw PCM types get wrapped in a WAV container
//! here; anything already container-framed passes through untouched.

pub const DEFAULT_BITS_PER_SAMPLE: u16 = 16;
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Descriptor assumed when the stream never announced one.
pub const DEFAULT_FORMAT: &str = "audio/L16;rate=24000";

const NUM_CHANNELS: u16 = 1;
const WAV_HEADER_LEN: u32 = 44;

/// PCM parameters recovered from a format descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmParams {
    pub bits_per_sample: u16,
    pub sample_rate: u32,
}

impl Default for PcmParams {
    fn default() -> Self {
        Self {
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// Parse bit depth and sample rate out of a descriptor.
///
/// Each field falls back to its default independently when missing or
/// malformed; partial format information is common and should degrade
/// gracefully rather than fail the run.
pub fn parse_format(descriptor: &str) -> PcmParams {
    let mut params = PcmParams::default();
    for part in descriptor.split(';') {
        let part = part.trim();
        let rate_prefix = part
            .get(..5)
            .map(|head| head.eq_ignore_ascii_case("rate="))
            .unwrap_or(false);
        if rate_prefix {
            if let Ok(rate) = part[5..].trim().parse::<u32>() {
                params.sample_rate = rate;
            }
        } else if let Some(bits) = part
            .strip_prefix("audio/L")
            .or_else(|| part.strip_prefix("audio/l"))
        {
            if let Ok(bits) = bits.parse::<u16>() {
                params.bits_per_sample = bits;
            }
        }
    }
    params
}

/// File extension for a descriptor's media type. Unknown and raw-PCM types
/// map to `wav`, which is the signal to wrap the bytes in a container.
pub fn extension_for(descriptor: &str) -> &'static str {
    let media_type = descriptor
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match media_type.as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" => "ogg",
        "audio/flac" | "audio/x-flac" => "flac",
        "audio/aac" => "aac",
        "audio/opus" => "opus",
        _ => "wav",
    }
}

/// Wrap raw mono PCM samples in a RIFF/WAVE container.
///
/// The canonical 44-byte header, all multi-byte fields little-endian:
/// `"RIFF"`, chunkSize, `"WAVE"`, `"fmt "`, subchunk1Size=16,
/// audioFormat=1 (PCM), numChannels, sampleRate, byteRate, blockAlign,
/// bitsPerSample, `"data"`, dataSize.
pub fn wav_from_pcm(pcm: &[u8], params: PcmParams) -> Vec<u8> {
    let data_size = pcm.len() as u32;
    let block_align = NUM_CHANNELS * (params.bits_per_sample / 8);
    // The rate comes from the remote descriptor; saturate rather than wrap
    // if it is absurd.
    let byte_rate = params.sample_rate.saturating_mul(block_align as u32);
    let chunk_size = WAV_HEADER_LEN - 8 + data_size;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN as usize + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&chunk_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&NUM_CHANNELS.to_le_bytes());
    out.extend_from_slice(&params.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&params.bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_rate_and_bit_depth() {
        let params = parse_format("audio/L16;rate=24000");
        assert_eq!(params.bits_per_sample, 16);
        assert_eq!(params.sample_rate, 24000);

        let params = parse_format("audio/L24; rate=48000");
        assert_eq!(params.bits_per_sample, 24);
        assert_eq!(params.sample_rate, 48000);
    }

    #[test]
    fn malformed_descriptor_degrades_to_defaults() {
        assert_eq!(parse_format("audio/unknown"), PcmParams::default());
        assert_eq!(parse_format(""), PcmParams::default());
        // Each field falls back on its own.
        let params = parse_format("audio/Lxx;rate=8000");
        assert_eq!(params.bits_per_sample, DEFAULT_BITS_PER_SAMPLE);
        assert_eq!(params.sample_rate, 8000);
        let params = parse_format("audio/L8;rate=banana");
        assert_eq!(params.bits_per_sample, 8);
        assert_eq!(params.sample_rate, DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn extension_registry_defaults_to_wav() {
        assert_eq!(extension_for("audio/L16;rate=24000"), "wav");
        assert_eq!(extension_for("audio/mpeg"), "mp3");
        assert_eq!(extension_for("audio/ogg;codecs=opus"), "ogg");
        assert_eq!(extension_for("application/octet-stream"), "wav");
    }

    #[test]
    fn wav_header_fields_are_byte_exact() {
        let pcm = vec![0u8; 48000];
        let wav = wav_from_pcm(&pcm, PcmParams::default());

        assert_eq!(wav.len(), 44 + 48000);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36 + 48000);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes(wav[16..20].try_into().unwrap()), 16);
        assert_eq!(u16::from_le_bytes(wav[20..22].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(wav[22..24].try_into().unwrap()), 1);
        assert_eq!(
            u32::from_le_bytes(wav[24..28].try_into().unwrap()),
            24000
        );
        assert_eq!(
            u32::from_le_bytes(wav[28..32].try_into().unwrap()),
            24000 * 2
        );
        assert_eq!(u16::from_le_bytes(wav[32..34].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(wav[34..36].try_into().unwrap()), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 48000);
    }

    #[test]
    fn absurd_sample_rate_saturates_byte_rate() {
        let params = PcmParams {
            bits_per_sample: 16,
            sample_rate: 4_000_000_000,
        };
        let wav = wav_from_pcm(&[0u8; 4], params);
        assert_eq!(
            u32::from_le_bytes(wav[24..28].try_into().unwrap()),
            4_000_000_000
        );
        assert_eq!(
            u32::from_le_bytes(wav[28..32].try_into().unwrap()),
            u32::MAX
        );
    }

    #[test]
    fn wav_output_decodes_with_hound() {
        let samples: Vec<i16> = (0..240).map(|n| (n * 64) as i16).collect();
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let wav = wav_from_pcm(&pcm, PcmParams::default());
        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }
}
