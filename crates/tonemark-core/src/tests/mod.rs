mod tones;
